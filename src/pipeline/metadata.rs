use serde_json::{Value, json};

use crate::clients::Cast;
use crate::models::Identity;

const MAX_DESCRIPTION_TEXT: usize = 280;

/// Compose the NFT metadata document for a minted cast.
pub fn compose(cast: &Cast, requester: &Identity, asset_uri: &str) -> Value {
    let mut text = cast.text.clone();
    if text.chars().count() > MAX_DESCRIPTION_TEXT {
        text = text.chars().take(MAX_DESCRIPTION_TEXT).collect::<String>() + "…";
    }

    json!({
        "name": format!("Cast by @{}", cast.author.username),
        "description": format!(
            "\"{}\"\n\nA cast by @{}, minted at the request of @{}.",
            text, cast.author.username, requester.username
        ),
        "image": asset_uri,
        "attributes": [
            { "trait_type": "Cast Hash", "value": cast.hash },
            { "trait_type": "Author FID", "value": cast.author.fid.to_string() },
            { "trait_type": "Requester FID", "value": requester.fid.to_string() },
        ],
    })
}

use crate::clients::{SplitConfig, SplitRecipient};

pub const OWNER_SHARE: u32 = 50;
pub const REQUESTER_SHARE: u32 = 5;
pub const PLATFORM_SHARE: u32 = 45;

/// Build the revenue-split configuration for a mint: content owner 50,
/// requester 5, platform 45. If owner and requester share an address their
/// shares combine (55/45, two recipients). Addresses are lowercased and
/// recipients sorted so the same participants always yield the same config,
/// which keeps on-chain split resolution idempotent.
pub fn split_config(owner: &str, requester: &str, platform: &str) -> SplitConfig {
    let owner = owner.to_lowercase();
    let requester = requester.to_lowercase();
    let platform = platform.to_lowercase();

    let mut recipients = if owner == requester {
        vec![
            SplitRecipient {
                address: owner,
                share: OWNER_SHARE + REQUESTER_SHARE,
            },
            SplitRecipient {
                address: platform,
                share: PLATFORM_SHARE,
            },
        ]
    } else {
        vec![
            SplitRecipient {
                address: owner,
                share: OWNER_SHARE,
            },
            SplitRecipient {
                address: requester,
                share: REQUESTER_SHARE,
            },
            SplitRecipient {
                address: platform,
                share: PLATFORM_SHARE,
            },
        ]
    };

    recipients.sort_by(|a, b| a.address.cmp(&b.address));
    SplitConfig { recipients }
}

use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub webhook_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub max_body_size: usize,
    /// Worker poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum provider trust score a requester needs to trigger a mint.
    pub min_user_score: f64,
    /// Handle the bot answers to in mint commands, without the leading @.
    pub bot_handle: String,
    /// Signer used to publish confirmation replies.
    pub signer_id: String,
    pub farcaster_api_url: String,
    pub farcaster_api_key: String,
    pub renderer_url: String,
    pub storage_url: String,
    pub storage_token: String,
    pub relay_url: String,
    pub relay_api_key: String,
    /// Collection contract new tokens are minted into.
    pub contract_address: String,
    /// Recipient of the platform share of every split.
    pub platform_address: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let webhook_secret = env_required("CASTMINT_WEBHOOK_SECRET")?;
        let farcaster_api_key = env_required("CASTMINT_FARCASTER_API_KEY")?;
        let signer_id = env_required("CASTMINT_SIGNER_ID")?;
        let storage_token = env_required("CASTMINT_STORAGE_TOKEN")?;
        let relay_api_key = env_required("CASTMINT_RELAY_API_KEY")?;
        let contract_address = env_required("CASTMINT_CONTRACT_ADDRESS")?;
        let platform_address = env_required("CASTMINT_PLATFORM_ADDRESS")?;

        let host: IpAddr = env_or("CASTMINT_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CASTMINT_HOST: {e}"))?;

        let port: u16 = env_or("CASTMINT_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid CASTMINT_PORT: {e}"))?;

        let max_body_size: usize = env_or("CASTMINT_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid CASTMINT_MAX_BODY_SIZE: {e}"))?;

        let poll_interval_ms: u64 = env_or("CASTMINT_POLL_INTERVAL_MS", "5000")
            .parse()
            .map_err(|e| format!("Invalid CASTMINT_POLL_INTERVAL_MS: {e}"))?;

        let min_user_score: f64 = env_or("CASTMINT_MIN_USER_SCORE", "0.5")
            .parse()
            .map_err(|e| format!("Invalid CASTMINT_MIN_USER_SCORE: {e}"))?;

        let log_level = env_or("CASTMINT_LOG_LEVEL", "info");
        let bot_handle = env_or("CASTMINT_BOT_HANDLE", "castmint");

        let farcaster_api_url = env_or("CASTMINT_FARCASTER_API_URL", "https://api.neynar.com/v2/farcaster");
        let renderer_url = env_or("CASTMINT_RENDERER_URL", "http://127.0.0.1:3001");
        let storage_url = env_or("CASTMINT_STORAGE_URL", "https://api.pinata.cloud");
        let relay_url = env_or("CASTMINT_RELAY_URL", "http://127.0.0.1:3002");

        Ok(Config {
            database_url,
            webhook_secret,
            host,
            port,
            log_level,
            max_body_size,
            poll_interval_ms,
            min_user_score,
            bot_handle,
            signer_id,
            farcaster_api_url,
            farcaster_api_key,
            renderer_url,
            storage_url,
            storage_token,
            relay_url,
            relay_api_key,
            contract_address,
            platform_address,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

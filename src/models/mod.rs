pub mod health;
pub mod mint_record;
pub mod webhook;
pub mod work_item;

pub use health::{HealthSnapshot, WorkerStatus};
pub use mint_record::MintRecord;
pub use webhook::{AuthorPayload, CastPayload, WebhookPayload};
pub use work_item::{FailedWorkItem, Identity, WorkItem};

pub mod finalizer;
pub mod replay_protection;
pub mod rewards;
pub mod sub_dag;
pub mod supervisor;

pub use finalizer::PeriodFinalizer;
pub use replay_protection::{is_stale_nonce, read_watermark, roll_window, sender_period_key, ReplayProtectionOp};
pub use rewards::{tally_rewards, RewardsStats};
pub use sub_dag::{collect_sub_dag, order_and_dedupe_transactions, order_hash, SubDagLookup};
pub use supervisor::{Supervisor, SupervisorState};

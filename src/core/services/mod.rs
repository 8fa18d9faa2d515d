pub mod contribution_service;
pub mod goal_service;
pub mod ledger_service;
pub mod reminder_service;
pub mod summary_service;

pub use contribution_service::ContributionService;
pub use goal_service::GoalService;
pub use ledger_service::{LedgerService, Posting, WithdrawalPolicy, WITHDRAWAL_METHOD};
pub use reminder_service::{
    schedule_occurrences, CancelOutcome, DeliveryOutcome, ReminderOccurrence, ReminderService,
    ReminderSettings, DEFAULT_REMINDER_COUNT,
};
pub use summary_service::{GoalOverview, SummaryService};

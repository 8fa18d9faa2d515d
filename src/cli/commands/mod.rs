mod goals;
mod money;
mod navigation;
mod reminders;
mod system;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    entries.extend(goals::definitions());
    entries.extend(money::definitions());
    entries.extend(reminders::definitions());
    entries.extend(navigation::definitions());
    entries.extend(system::definitions());
    entries
}

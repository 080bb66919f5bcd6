// View filtering for listed tasks

use crate::models::Task;

/// Which tasks a list view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Filter {
    #[default]
    All,
    Active, // done == false
    Done,   // done == true
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.done,
            Filter::Done => task.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let open = Task::new(1, "open");
        let mut closed = Task::new(2, "closed");
        closed.done = true;

        assert!(Filter::All.matches(&open));
        assert!(Filter::All.matches(&closed));
        assert!(Filter::Active.matches(&open));
        assert!(!Filter::Active.matches(&closed));
        assert!(!Filter::Done.matches(&open));
        assert!(Filter::Done.matches(&closed));
    }
}

use crate::alerts::AlertStream;
use crate::loader::{ScheduleLoader, ScheduleSource};

/// One named lesson list; several of them are compared side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSeries<T> {
    pub name: String,
    pub data: Vec<T>,
}

/// Two independent loaders feeding the calendar: the primary identity and an
/// optional second one for comparison.
pub struct ScheduleView<S: ScheduleSource> {
    primary: ScheduleLoader<S>,
    secondary: ScheduleLoader<S>,
}

impl<S: ScheduleSource> ScheduleView<S> {
    pub fn new(source: S, extramural: bool) -> Self {
        Self {
            primary: ScheduleLoader::new(source.clone(), extramural),
            secondary: ScheduleLoader::new(source, extramural),
        }
    }

    /// React to a new selection. A missing second identity clears the
    /// secondary data right away.
    pub fn on_selection_change(&mut self, selected: &[String]) {
        if let Some(first) = selected.first() {
            self.primary.load(first);
        }
        match selected.get(1).filter(|s| !s.is_empty()) {
            Some(second) => {
                self.secondary.load(second);
            }
            None => self.secondary.clear(),
        }
    }

    pub fn poll(&mut self, online: bool, alerts: &mut AlertStream) -> bool {
        let a = self.primary.poll(online, alerts);
        let b = self.secondary.poll(online, alerts);
        a || b
    }

    pub fn is_fetching(&self) -> bool {
        self.primary.is_fetching() || self.secondary.is_fetching()
    }

    /// Series for the current selection. Secondary data only counts while a
    /// second identity is selected, so leftovers from an earlier comparison
    /// never show up.
    pub fn merged(&self, selected: &[String]) -> Vec<ScheduleSeries<S::Item>> {
        let mut out = Vec::with_capacity(2);
        let Some(first) = selected.first() else {
            return out;
        };
        out.push(ScheduleSeries { name: first.clone(), data: self.primary.data().to_vec() });
        if let Some(second) = selected.get(1).filter(|s| !s.is_empty()) {
            if !self.secondary.data().is_empty() {
                out.push(ScheduleSeries {
                    name: second.clone(),
                    data: self.secondary.data().to_vec(),
                });
            }
        }
        out
    }
}

use std::collections::BTreeSet;

use log::{debug, info};

use crate::config;
use crate::faq::analytics::{AnalyticsSink, FaqInteraction};
use crate::faq::catalog::{FaqCatalog, FaqCategory, FaqEntry};
use crate::faq::debounce::{Debounced, Ticket};
use crate::faq::highlight::{highlight, Segment};
use crate::faq::keyboard::{FocusDirection, KeyAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Nearest,
    Center,
}

/// DOM work the page performs after the next render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScrollIntoView { entry_id: String, block: ScrollBlock },
    Focus { entry_id: String },
    Print,
}

/// Per-page accordion state. Entries are referenced by their flattened
/// catalog index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    expanded: BTreeSet<usize>,
    search_query: String,
    focused_index: Option<usize>,
}

impl UiState {
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Position of the focused question within the visible list.
    #[cfg(test)]
    pub fn focused_index(&self) -> Option<usize> {
        self.focused_index
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }
}

/// Owns the FAQ entries and everything the page needs to render them:
/// which entry is open, which entries pass the search filter and which
/// question has keyboard focus.
///
/// Outside of [`FaqController::expand_all`] at most one entry is expanded.
pub struct FaqController<A: AnalyticsSink> {
    catalog: FaqCatalog,
    visible: Vec<bool>,
    state: UiState,
    search: Debounced<String>,
    effects: Vec<Effect>,
    analytics: A,
}

impl<A: AnalyticsSink> FaqController<A> {
    pub fn new(catalog: FaqCatalog, analytics: A) -> Self {
        let visible = vec![true; catalog.len()];
        info!("FAQ controller ready with {} entries", catalog.len());
        Self {
            catalog,
            visible,
            state: UiState::default(),
            search: Debounced::new(),
            effects: Vec::new(),
            analytics,
        }
    }

    pub fn catalog(&self) -> &FaqCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    #[cfg(test)]
    pub fn analytics(&self) -> &A {
        &self.analytics
    }

    /// Drains the side effects requested since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ---- accordion ----

    pub fn toggle_entry(&mut self, entry_id: &str, force_open: bool) {
        let Some(index) = self.catalog.position(entry_id) else {
            debug!("Ignoring toggle for unknown FAQ entry {}", entry_id);
            return;
        };
        if force_open || !self.state.expanded.contains(&index) {
            self.open(index, ScrollBlock::Nearest);
        } else {
            self.state.expanded.remove(&index);
        }
    }

    pub fn expand_all(&mut self) {
        self.state.expanded = (0..self.catalog.len()).collect();
    }

    pub fn collapse_all(&mut self) {
        self.state.expanded.clear();
    }

    pub fn is_expanded(&self, entry_id: &str) -> bool {
        self.catalog
            .position(entry_id)
            .map_or(false, |index| self.state.expanded.contains(&index))
    }

    /// The single expanded entry. `None` when nothing or, after
    /// [`FaqController::expand_all`], more than one entry is open.
    pub fn expanded_entry_id(&self) -> Option<&str> {
        if self.state.expanded.len() != 1 {
            return None;
        }
        let index = *self.state.expanded.iter().next()?;
        self.catalog.entry_at(index).map(|e| e.id.as_str())
    }

    fn open(&mut self, index: usize, block: ScrollBlock) {
        let newly_opened = !self.state.expanded.contains(&index);
        self.state.expanded.clear();
        self.state.expanded.insert(index);

        let Some(entry) = self.catalog.entry_at(index) else {
            return;
        };
        if newly_opened {
            self.analytics.track_faq(&FaqInteraction::Open {
                question: entry.question.clone(),
            });
        }
        self.effects.push(Effect::ScrollIntoView {
            entry_id: entry.id.clone(),
            block,
        });
    }

    // ---- search ----

    /// Queues `query` behind the search debounce. The returned ticket is
    /// handed back through [`FaqController::apply_pending_search`] when the
    /// timer fires; any later request or clear makes it stale.
    pub fn set_search_query(&mut self, query: &str) -> Ticket {
        if query.chars().count() > config::MIN_TRACKED_SEARCH_LEN {
            self.analytics.track_faq(&FaqInteraction::Search {
                query: query.to_string(),
            });
        }
        self.search.schedule(query.to_string())
    }

    /// Returns true when the ticket was still current and its query was applied.
    pub fn apply_pending_search(&mut self, ticket: Ticket) -> bool {
        match self.search.settle(ticket) {
            Some(query) => {
                self.apply_search(&query);
                true
            }
            None => false,
        }
    }

    pub fn clear_search(&mut self) {
        self.search.cancel();
        self.apply_search("");
    }

    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    fn apply_search(&mut self, query: &str) {
        let normalized = query.trim().to_lowercase();
        let focused_entry = self
            .state
            .focused_index
            .and_then(|i| self.visible_indices().get(i).copied());

        self.visible = self
            .catalog
            .entries()
            .map(|entry| matches_query(entry, &normalized))
            .collect();
        self.state.search_query = normalized;

        let visible = &self.visible;
        self.state.expanded.retain(|&index| visible[index]);
        self.state.focused_index = focused_entry
            .and_then(|entry| self.visible_indices().iter().position(|&i| i == entry));

        debug!(
            "FAQ filter {:?} leaves {} of {} entries",
            self.state.search_query,
            self.visible_count(),
            self.catalog.len()
        );
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&v| v).count()
    }

    pub fn is_visible(&self, entry_id: &str) -> bool {
        self.catalog
            .position(entry_id)
            .map_or(false, |index| self.visible[index])
    }

    pub fn is_category_visible(&self, category: &FaqCategory) -> bool {
        category.entries.iter().any(|e| self.is_visible(&e.id))
    }

    pub fn visible_entries<'a>(
        &'a self,
        category: &'a FaqCategory,
    ) -> impl Iterator<Item = &'a FaqEntry> + 'a {
        category.entries.iter().filter(move |e| self.is_visible(&e.id))
    }

    /// Question text split for rendering with the active query marked.
    pub fn question_segments<'a>(&self, entry: &'a FaqEntry) -> Vec<Segment<'a>> {
        highlight(&entry.question, &self.state.search_query)
    }

    fn visible_indices(&self) -> Vec<usize> {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect()
    }

    // ---- keyboard focus ----

    pub fn move_focus(&mut self, direction: FocusDirection) {
        let visible = self.visible_indices();
        if visible.is_empty() {
            return;
        }
        let last = visible.len() - 1;
        let target = match (direction, self.state.focused_index) {
            (FocusDirection::First, _) => Some(0),
            (FocusDirection::Last, _) => Some(last),
            (FocusDirection::Next, Some(i)) => (i < last).then(|| i + 1),
            (FocusDirection::Previous, Some(i)) => i.checked_sub(1),
            (_, None) => None,
        };
        let Some(target) = target else {
            return;
        };
        self.state.focused_index = Some(target);
        if let Some(entry) = self.catalog.entry_at(visible[target]) {
            self.effects.push(Effect::Focus {
                entry_id: entry.id.clone(),
            });
        }
    }

    /// Records that a question received DOM focus (mouse, Tab, or script).
    pub fn focus_entry(&mut self, entry_id: &str) {
        let Some(index) = self.catalog.position(entry_id) else {
            return;
        };
        if let Some(position) = self.visible_indices().iter().position(|&i| i == index) {
            self.state.focused_index = Some(position);
        }
    }

    /// Handles a keydown coming from the question `entry_id`. Returns whether
    /// the key was consumed.
    pub fn handle_key(&mut self, key: &str, entry_id: &str) -> bool {
        let Some(action) = KeyAction::from_key(key) else {
            return false;
        };
        self.focus_entry(entry_id);
        match action {
            KeyAction::Move(direction) => self.move_focus(direction),
            KeyAction::Toggle => self.toggle_entry(entry_id, false),
        }
        true
    }

    // ---- collaborators ----

    /// Opens the entry named by a deep link and centers it. An entry hidden by
    /// the current search, or by a search still waiting on the debounce, is
    /// revealed by clearing the search first. Returns whether it was cleared.
    pub fn show_entry(&mut self, entry_id: &str) -> bool {
        let Some(index) = self.catalog.position(entry_id) else {
            debug!("Deep link to unknown FAQ entry {}", entry_id);
            return false;
        };
        let Some(entry) = self.catalog.entry_at(index) else {
            return false;
        };
        let hidden_by_pending = self
            .search
            .pending()
            .map_or(false, |query| !matches_query(entry, &query.trim().to_lowercase()));
        let cleared = !self.visible[index] || hidden_by_pending;
        if cleared {
            self.clear_search();
        }
        self.open(index, ScrollBlock::Center);
        cleared
    }

    /// Expands everything and asks the page to open the print dialog. The
    /// expansion is left in place afterwards.
    pub fn print(&mut self) {
        self.expand_all();
        self.effects.push(Effect::Print);
    }
}

fn matches_query(entry: &FaqEntry, query: &str) -> bool {
    query.is_empty()
        || entry.question.to_lowercase().contains(query)
        || entry.answer.to_lowercase().contains(query)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::faq::analytics::EventParams;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<(String, EventParams)>>,
    }

    impl AnalyticsSink for RecordingSink {
        fn track(&self, name: &str, params: &EventParams) {
            self.events
                .borrow_mut()
                .push((name.to_string(), params.clone()));
        }
    }

    impl RecordingSink {
        fn actions(&self) -> Vec<(String, String)> {
            self.events
                .borrow()
                .iter()
                .map(|(_, p)| (p.action.clone(), p.event_label.clone()))
                .collect()
        }
    }

    fn entry(id: &str, question: &str, answer: &str, category: &str) -> FaqEntry {
        FaqEntry {
            id: id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            category_id: category.to_string(),
        }
    }

    // Five entries in two categories; only q2 and q4 mention refunds and the
    // second category has neither.
    fn sample_catalog() -> FaqCatalog {
        FaqCatalog::new(vec![
            FaqCategory {
                id: "account".to_string(),
                title: "Account".to_string(),
                entries: vec![
                    entry("q1", "How do I sign up?", "Download the app.", "account"),
                    entry("q2", "Can I get a Refund?", "Yes, within 24 hours.", "account"),
                    entry("q3", "Is it free?", "Opening an account is free.", "account"),
                    entry("q4", "Failed transfer?", "A REFUND is issued automatically.", "account"),
                ],
            },
            FaqCategory {
                id: "security".to_string(),
                title: "Security".to_string(),
                entries: vec![
                    entry("q5", "Is my money safe?", "Balances sit with partner banks.", "security"),
                ],
            },
        ])
        .unwrap()
    }

    fn controller() -> FaqController<RecordingSink> {
        FaqController::new(sample_catalog(), RecordingSink::default())
    }

    fn search_now(c: &mut FaqController<RecordingSink>, query: &str) {
        let ticket = c.set_search_query(query);
        assert!(c.apply_pending_search(ticket));
    }

    #[test]
    fn toggling_second_entry_collapses_first() {
        let mut c = controller();
        c.toggle_entry("q1", false);
        assert_eq!(c.expanded_entry_id(), Some("q1"));

        c.toggle_entry("q2", false);
        assert!(!c.is_expanded("q1"));
        assert!(c.is_expanded("q2"));
        assert_eq!(c.state().expanded_count(), 1);
    }

    #[test]
    fn toggling_open_entry_collapses_it() {
        let mut c = controller();
        c.toggle_entry("q3", false);
        c.toggle_entry("q3", false);
        assert_eq!(c.expanded_entry_id(), None);
    }

    #[test]
    fn force_open_keeps_entry_open() {
        let mut c = controller();
        c.toggle_entry("q3", false);
        c.toggle_entry("q3", true);
        assert_eq!(c.expanded_entry_id(), Some("q3"));
    }

    #[test]
    fn unknown_entry_is_ignored() {
        let mut c = controller();
        c.toggle_entry("q1", false);
        c.toggle_entry("nope", false);
        assert_eq!(c.expanded_entry_id(), Some("q1"));
    }

    #[test]
    fn at_most_one_entry_open_across_toggles() {
        let mut c = controller();
        for id in ["q1", "q4", "q4", "q2", "q5", "q1", "q1", "q3"] {
            c.toggle_entry(id, false);
            assert!(c.state().expanded_count() <= 1);
        }
    }

    #[test]
    fn opening_requests_scroll_and_tracks_question() {
        let mut c = controller();
        c.toggle_entry("q5", false);
        assert_eq!(
            c.take_effects(),
            vec![Effect::ScrollIntoView {
                entry_id: "q5".to_string(),
                block: ScrollBlock::Nearest,
            }]
        );
        assert_eq!(
            c.analytics().actions(),
            vec![("open".to_string(), "Is my money safe?".to_string())]
        );

        c.toggle_entry("q5", false);
        assert!(c.take_effects().is_empty());
        assert_eq!(c.analytics().actions().len(), 1);
    }

    #[test]
    fn refund_search_hides_other_entries_and_category() {
        let mut c = controller();
        search_now(&mut c, "refund");

        assert_eq!(c.visible_count(), 2);
        assert!(c.is_visible("q2"));
        assert!(c.is_visible("q4"));
        assert!(!c.is_visible("q1"));

        let categories = c.catalog().categories().to_vec();
        assert!(c.is_category_visible(&categories[0]));
        assert!(!c.is_category_visible(&categories[1]));
        let shown: Vec<&str> = c
            .visible_entries(&categories[0])
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(shown, vec!["q2", "q4"]);

        search_now(&mut c, "safe");
        assert!(!c.is_category_visible(&categories[0]));
        assert!(c.is_category_visible(&categories[1]));
    }

    #[test]
    fn visible_count_matches_case_insensitive_count() {
        let mut c = controller();
        for query in ["IS", "free", "  Refund ", "app", "zzz", "?"] {
            search_now(&mut c, query);
            let needle = query.trim().to_lowercase();
            let expected = c
                .catalog()
                .entries()
                .filter(|e| {
                    e.question.to_lowercase().contains(&needle)
                        || e.answer.to_lowercase().contains(&needle)
                })
                .count();
            assert_eq!(c.visible_count(), expected, "query {:?}", query);
        }
    }

    #[test]
    fn empty_query_restores_everything() {
        let mut c = controller();
        search_now(&mut c, "refund");
        search_now(&mut c, "");
        assert_eq!(c.visible_count(), c.catalog().len());

        search_now(&mut c, "nothing matches this");
        assert_eq!(c.visible_count(), 0);
        c.clear_search();
        assert_eq!(c.visible_count(), 5);
        assert_eq!(c.state().search_query(), "");
    }

    #[test]
    fn query_is_trimmed_and_lowercased() {
        let mut c = controller();
        search_now(&mut c, "  REFUND  ");
        assert_eq!(c.state().search_query(), "refund");
    }

    #[test]
    fn hidden_expanded_entry_collapses() {
        let mut c = controller();
        c.toggle_entry("q1", false);
        search_now(&mut c, "refund");
        assert_eq!(c.expanded_entry_id(), None);

        c.toggle_entry("q2", false);
        search_now(&mut c, "refund");
        assert_eq!(c.expanded_entry_id(), Some("q2"));
    }

    #[test]
    fn rapid_queries_only_apply_the_last() {
        let mut c = controller();
        let a = c.set_search_query("a");
        let ab = c.set_search_query("ab");
        let abc = c.set_search_query("abc");

        assert!(!c.apply_pending_search(a));
        assert!(!c.apply_pending_search(ab));
        assert_eq!(c.state().search_query(), "");
        assert_eq!(c.visible_count(), 5);

        assert!(c.apply_pending_search(abc));
        assert_eq!(c.state().search_query(), "abc");
        assert!(!c.has_pending_search());
    }

    #[test]
    fn clear_cancels_pending_search() {
        let mut c = controller();
        let ticket = c.set_search_query("refund");
        c.clear_search();
        assert!(!c.apply_pending_search(ticket));
        assert_eq!(c.visible_count(), 5);
    }

    #[test]
    fn only_longer_searches_are_tracked() {
        let mut c = controller();
        c.set_search_query("re");
        c.set_search_query("ref");
        assert_eq!(
            c.analytics().actions(),
            vec![("search".to_string(), "ref".to_string())]
        );
    }

    #[test]
    fn highlights_against_unmarked_question() {
        let mut c = controller();
        search_now(&mut c, "refund");
        search_now(&mut c, "refund");
        let entry = c.catalog().entry_at(1).unwrap().clone();
        assert_eq!(
            c.question_segments(&entry),
            vec![Segment::Plain("Can I get a "), Segment::Match("Refund"), Segment::Plain("?")]
        );

        c.clear_search();
        assert_eq!(c.question_segments(&entry), vec![Segment::Plain("Can I get a Refund?")]);
    }

    #[test]
    fn focus_moves_without_wrapping() {
        let mut c = controller();
        c.move_focus(FocusDirection::Last);
        assert_eq!(c.state().focused_index(), Some(4));
        c.move_focus(FocusDirection::Next);
        assert_eq!(c.state().focused_index(), Some(4));

        c.move_focus(FocusDirection::First);
        assert_eq!(c.state().focused_index(), Some(0));
        c.move_focus(FocusDirection::Previous);
        assert_eq!(c.state().focused_index(), Some(0));

        c.move_focus(FocusDirection::Next);
        assert_eq!(c.state().focused_index(), Some(1));
        let effects = c.take_effects();
        assert_eq!(
            effects.last(),
            Some(&Effect::Focus {
                entry_id: "q2".to_string()
            })
        );
    }

    #[test]
    fn relative_moves_need_existing_focus() {
        let mut c = controller();
        c.move_focus(FocusDirection::Next);
        c.move_focus(FocusDirection::Previous);
        assert_eq!(c.state().focused_index(), None);
        assert!(c.take_effects().is_empty());
    }

    #[test]
    fn focus_traverses_visible_entries_only() {
        let mut c = controller();
        search_now(&mut c, "refund");
        c.focus_entry("q2");
        c.move_focus(FocusDirection::Next);
        assert_eq!(c.take_effects(), vec![Effect::Focus { entry_id: "q4".to_string() }]);
        assert_eq!(c.state().focused_index(), Some(1));
        c.move_focus(FocusDirection::Next);
        assert_eq!(c.state().focused_index(), Some(1));
    }

    #[test]
    fn focus_is_remapped_or_cleared_by_filtering() {
        let mut c = controller();
        c.focus_entry("q4");
        assert_eq!(c.state().focused_index(), Some(3));

        search_now(&mut c, "refund");
        assert_eq!(c.state().focused_index(), Some(1));

        search_now(&mut c, "sign up");
        assert_eq!(c.state().focused_index(), None);
    }

    #[test]
    fn no_visible_entries_means_no_focus_moves() {
        let mut c = controller();
        search_now(&mut c, "zzz");
        c.move_focus(FocusDirection::First);
        assert_eq!(c.state().focused_index(), None);
    }

    #[test]
    fn keys_drive_focus_and_toggle() {
        let mut c = controller();
        assert!(c.handle_key("ArrowDown", "q1"));
        assert_eq!(c.state().focused_index(), Some(1));
        assert!(c.handle_key("End", "q2"));
        assert_eq!(c.state().focused_index(), Some(4));
        assert!(c.handle_key("Enter", "q5"));
        assert_eq!(c.expanded_entry_id(), Some("q5"));
        assert!(c.handle_key(" ", "q5"));
        assert_eq!(c.expanded_entry_id(), None);
        assert!(!c.handle_key("Tab", "q5"));
    }

    #[test]
    fn expand_all_then_collapse_all() {
        let mut c = controller();
        c.toggle_entry("q2", false);
        c.expand_all();
        assert_eq!(c.state().expanded_count(), 5);
        assert_eq!(c.expanded_entry_id(), None);
        assert!(c.catalog().entries().all(|e| c.is_expanded(&e.id)));

        c.collapse_all();
        assert_eq!(c.state().expanded_count(), 0);
        assert_eq!(c.expanded_entry_id(), None);
    }

    #[test]
    fn toggle_after_expand_all_restores_single_open() {
        let mut c = controller();
        c.expand_all();
        c.toggle_entry("q3", true);
        assert_eq!(c.expanded_entry_id(), Some("q3"));
    }

    #[test]
    fn print_expands_everything_and_requests_dialog() {
        let mut c = controller();
        c.print();
        assert_eq!(c.state().expanded_count(), 5);
        assert_eq!(c.take_effects(), vec![Effect::Print]);
    }

    #[test]
    fn deep_link_reveals_and_centers_entry() {
        let mut c = controller();
        search_now(&mut c, "refund");
        c.take_effects();

        assert!(c.show_entry("q5"));
        assert_eq!(c.state().search_query(), "");
        assert_eq!(c.expanded_entry_id(), Some("q5"));
        assert_eq!(
            c.take_effects(),
            vec![Effect::ScrollIntoView {
                entry_id: "q5".to_string(),
                block: ScrollBlock::Center,
            }]
        );

        assert!(!c.show_entry("unknown"));
        assert_eq!(c.expanded_entry_id(), Some("q5"));
    }

    #[test]
    fn deep_link_cancels_pending_search_that_would_hide_it() {
        let mut c = controller();
        let ticket = c.set_search_query("safe");

        assert!(c.show_entry("q2"));
        assert!(!c.has_pending_search());
        assert!(!c.apply_pending_search(ticket));
        assert_eq!(c.state().search_query(), "");
        assert!(c.is_visible("q2"));
        assert_eq!(c.expanded_entry_id(), Some("q2"));
    }

    #[test]
    fn deep_link_keeps_pending_search_that_still_shows_it() {
        let mut c = controller();
        let ticket = c.set_search_query(" Refund ");

        assert!(!c.show_entry("q4"));
        assert!(c.apply_pending_search(ticket));
        assert_eq!(c.state().search_query(), "refund");
        assert_eq!(c.expanded_entry_id(), Some("q4"));
    }

    #[test]
    fn deep_link_to_visible_entry_keeps_search() {
        let mut c = controller();
        search_now(&mut c, "refund");
        assert!(!c.show_entry("q2"));
        assert_eq!(c.state().search_query(), "refund");
        assert_eq!(c.expanded_entry_id(), Some("q2"));
    }

    #[test]
    fn final_sigma_entry_is_found_and_marked() {
        let catalog = FaqCatalog::new(vec![FaqCategory {
            id: "greek".to_string(),
            title: "Greek".to_string(),
            entries: vec![entry("g1", "ΠΟΙΑ ΟΔΟΣ;", "Η οδός.", "greek")],
        }])
        .unwrap();
        let mut c = FaqController::new(catalog, RecordingSink::default());
        search_now(&mut c, "ος");

        assert!(c.is_visible("g1"));
        let entry = c.catalog().entry_at(0).unwrap().clone();
        assert_eq!(
            c.question_segments(&entry),
            vec![
                Segment::Plain("ΠΟΙΑ ΟΔ"),
                Segment::Match("ΟΣ"),
                Segment::Plain(";")
            ]
        );
    }

    #[test]
    fn empty_catalog_degrades_to_no_results() {
        let mut c = FaqController::new(FaqCatalog::default(), RecordingSink::default());
        assert_eq!(c.visible_count(), 0);
        search_now(&mut c, "anything");
        assert_eq!(c.visible_count(), 0);
        c.move_focus(FocusDirection::Last);
        c.expand_all();
        c.collapse_all();
        assert_eq!(c.expanded_entry_id(), None);
    }
}

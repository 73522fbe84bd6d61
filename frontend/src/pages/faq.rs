use gloo_timers::callback::Timeout;
use log::info;
use wasm_bindgen::JsCast;
use web_sys::{
    window, Element, Event, FocusEvent, HtmlElement, HtmlInputElement, InputEvent, KeyboardEvent,
    MouseEvent, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::config;
use crate::faq::analytics::GtagSink;
use crate::faq::catalog::{FaqCatalog, FaqCategory, FaqEntry};
use crate::faq::controller::{Effect, FaqController, ScrollBlock};
use crate::faq::debounce::Ticket;
use crate::faq::deep_link::current_entry_request;
use crate::faq::highlight::Segment;
use crate::faq::keyboard::KeyAction;

pub enum FaqMsg {
    Toggle(String),
    SearchInput(String),
    SearchSettled(Ticket),
    ClearSearch,
    Key { key: String, entry_id: String },
    QuestionFocused(String),
    ExpandAll,
    CollapseAll,
    Print,
    ShowEntry(String),
}

pub struct FaqPage {
    controller: FaqController<GtagSink>,
    search_input: NodeRef,
    search_timer: Option<Timeout>,
    scroll_timer: Option<Timeout>,
    print_timer: Option<Timeout>,
}

fn question_dom_id(entry_id: &str) -> String {
    format!("{}-question", entry_id)
}

fn answer_dom_id(entry_id: &str) -> String {
    format!("{}-answer", entry_id)
}

fn element_by_id(id: &str) -> Option<Element> {
    window()?.document()?.get_element_by_id(id)
}

// Entry id of the question button an event came from, if any.
fn question_entry_id(target: Option<Element>) -> Option<String> {
    target?
        .closest(".faq-question")
        .ok()
        .flatten()?
        .get_attribute("data-entry-id")
}

fn view_segment(segment: Segment<'_>) -> Html {
    match segment {
        Segment::Plain(text) => html! { <>{ text }</> },
        Segment::Match(text) => html! { <mark>{ text }</mark> },
    }
}

impl FaqPage {
    fn clear_search_input(&self) {
        if let Some(input) = self.search_input.cast::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ScrollIntoView { entry_id, block } => {
                let Some(item) = element_by_id(&entry_id) else {
                    return;
                };
                let block = match block {
                    ScrollBlock::Nearest => ScrollLogicalPosition::Nearest,
                    ScrollBlock::Center => ScrollLogicalPosition::Center,
                };
                self.scroll_timer = Some(Timeout::new(config::SCROLL_DELAY_MS, move || {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    options.set_block(block);
                    item.scroll_into_view_with_scroll_into_view_options(&options);
                }));
            }
            Effect::Focus { entry_id } => {
                if let Some(button) = element_by_id(&question_dom_id(&entry_id))
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                {
                    let _ = button.focus();
                }
            }
            Effect::Print => {
                self.print_timer = Some(Timeout::new(config::PRINT_DELAY_MS, || {
                    if let Some(window) = window() {
                        let _ = window.print();
                    }
                }));
            }
        }
    }

    fn view_category(&self, category: &FaqCategory) -> Html {
        html! {
            <div class="faq-category" key={category.id.clone()}>
                <h2>{ &category.title }</h2>
                { for self.controller.visible_entries(category).map(|entry| self.view_entry(entry)) }
            </div>
        }
    }

    fn view_entry(&self, entry: &FaqEntry) -> Html {
        let open = self.controller.is_expanded(&entry.id);
        let question_id = question_dom_id(&entry.id);
        let answer_id = answer_dom_id(&entry.id);

        html! {
            <div id={entry.id.clone()} key={entry.id.clone()} class={classes!("faq-item", open.then(|| "open"))}>
                <button
                    id={question_id.clone()}
                    type="button"
                    class="faq-question"
                    data-entry-id={entry.id.clone()}
                    aria-expanded={open.to_string()}
                    aria-controls={answer_id.clone()}
                >
                    <span class="question-text">
                        { for self.controller.question_segments(entry).into_iter().map(view_segment) }
                    </span>
                    <span class="toggle-icon">{ if open { "−" } else { "+" } }</span>
                </button>
                <div
                    id={answer_id}
                    class="faq-answer"
                    role="region"
                    aria-labelledby={question_id}
                    aria-hidden={(!open).to_string()}
                >
                    <p>{ &entry.answer }</p>
                </div>
            </div>
        }
    }

    fn view_no_results(&self) -> Html {
        if self.controller.visible_count() > 0 {
            return html! {};
        }
        let query = self.controller.state().search_query();
        let text = if self.controller.catalog().is_empty() {
            "There are no questions here yet. ".to_string()
        } else {
            format!(
                "We couldn't find any questions matching \"{}\". Try different keywords or ",
                query
            )
        };

        html! {
            <div class="faq-no-results">
                <div class="faq-no-results__icon">{"🔍"}</div>
                <h3 class="faq-no-results__title">{"No results found"}</h3>
                <p class="faq-no-results__text">
                    { text }
                    <a href={config::CONTACT_PAGE_URL}>{"contact us"}</a>
                    {" directly."}
                </p>
            </div>
        }
    }
}

impl Component for FaqPage {
    type Message = FaqMsg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            controller: FaqController::new(FaqCatalog::embedded(), GtagSink),
            search_input: NodeRef::default(),
            search_timer: None,
            scroll_timer: None,
            print_timer: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            FaqMsg::Toggle(entry_id) => {
                self.controller.toggle_entry(&entry_id, false);
                true
            }
            FaqMsg::SearchInput(value) => {
                let ticket = self.controller.set_search_query(&value);
                let link = ctx.link().clone();
                // Replacing the timer drops the previous one, which cancels it.
                self.search_timer = Some(Timeout::new(config::SEARCH_DEBOUNCE_MS, move || {
                    link.send_message(FaqMsg::SearchSettled(ticket));
                }));
                true
            }
            FaqMsg::SearchSettled(ticket) => self.controller.apply_pending_search(ticket),
            FaqMsg::ClearSearch => {
                self.search_timer = None;
                self.clear_search_input();
                self.controller.clear_search();
                true
            }
            FaqMsg::Key { key, entry_id } => self.controller.handle_key(&key, &entry_id),
            FaqMsg::QuestionFocused(entry_id) => {
                self.controller.focus_entry(&entry_id);
                false
            }
            FaqMsg::ExpandAll => {
                self.controller.expand_all();
                true
            }
            FaqMsg::CollapseAll => {
                self.controller.collapse_all();
                true
            }
            FaqMsg::Print => {
                info!("Expanding FAQ for printing");
                self.controller.print();
                true
            }
            FaqMsg::ShowEntry(entry_id) => {
                if self.controller.show_entry(&entry_id) {
                    self.search_timer = None;
                    self.clear_search_input();
                }
                if let Some(open) = self.controller.expanded_entry_id() {
                    info!("Deep link opened FAQ entry {}", open);
                }
                true
            }
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        for effect in self.controller.take_effects() {
            self.run_effect(effect);
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        let oninput = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            FaqMsg::SearchInput(input.value())
        });
        let onsearchkeydown =
            link.batch_callback(|e: KeyboardEvent| (e.key() == "Escape").then(|| FaqMsg::ClearSearch));

        // One set of listeners for every question in the list.
        let onclick = link.batch_callback(|e: MouseEvent| {
            question_entry_id(e.target_dyn_into::<Element>()).map(FaqMsg::Toggle)
        });
        let onkeydown = link.batch_callback(|e: KeyboardEvent| {
            let entry_id = question_entry_id(e.target_dyn_into::<Element>())?;
            let key = e.key();
            KeyAction::from_key(&key)?;
            e.prevent_default();
            Some(FaqMsg::Key { key, entry_id })
        });
        let onfocusin = link.batch_callback(|e: FocusEvent| {
            question_entry_id(e.target_dyn_into::<Element>()).map(FaqMsg::QuestionFocused)
        });

        html! {
            <div class="faq-page">
                <HashWatcher on_entry={link.callback(FaqMsg::ShowEntry)} />
                <section class="faq-hero">
                    <h1>{"Frequently Asked Questions"}</h1>
                    <p>{"Everything you need to know about sending, saving and spending with MonieKing"}</p>
                    <div class={classes!("faq-search", self.controller.has_pending_search().then(|| "searching"))}>
                        <input
                            id="faqSearch"
                            type="search"
                            ref={self.search_input.clone()}
                            placeholder="Search questions..."
                            aria-label="Search frequently asked questions"
                            {oninput}
                            onkeydown={onsearchkeydown}
                        />
                    </div>
                </section>

                <div class="faq-toolbar">
                    <button type="button" class="faq-toolbar-button" onclick={link.callback(|_| FaqMsg::ExpandAll)}>
                        {"Expand all"}
                    </button>
                    <button
                        type="button"
                        class="faq-toolbar-button"
                        disabled={self.controller.state().expanded_count() == 0}
                        onclick={link.callback(|_| FaqMsg::CollapseAll)}
                    >
                        {"Collapse all"}
                    </button>
                    <button type="button" class="faq-toolbar-button" onclick={link.callback(|_| FaqMsg::Print)}>
                        {"Print"}
                    </button>
                </div>

                <section class="faq-content" {onclick} {onkeydown} {onfocusin}>
                    {
                        for self.controller.catalog().categories().iter()
                            .filter(|category| self.controller.is_category_visible(category))
                            .map(|category| self.view_category(category))
                    }
                    { self.view_no_results() }
                </section>

                <style>{ FAQ_STYLES }</style>
            </div>
        }
    }
}

#[derive(Properties, PartialEq)]
struct HashWatcherProps {
    on_entry: Callback<String>,
}

/// Turns `#entry-id` fragments into entry requests, once shortly after load
/// and then on every `hashchange`.
#[function_component(HashWatcher)]
fn hash_watcher(props: &HashWatcherProps) -> Html {
    {
        let on_entry = props.on_entry.clone();
        use_event_with_window("hashchange", move |_: Event| {
            if let Some(entry_id) = current_entry_request() {
                on_entry.emit(entry_id);
            }
        });
    }
    {
        let on_entry = props.on_entry.clone();
        let _initial = use_timeout(
            move || {
                if let Some(entry_id) = current_entry_request() {
                    on_entry.emit(entry_id);
                }
            },
            config::HASH_NAVIGATION_DELAY_MS,
        );
    }

    html! {}
}

const FAQ_STYLES: &str = r#"
.faq-page {
    min-height: 100vh;
    color: #1b1f2a;
    background: #f7f8fc;
    padding-bottom: 4rem;
}

.faq-hero {
    text-align: center;
    padding: 5rem 2rem 3rem;
    background: linear-gradient(135deg, #0f5132 0%, #198754 100%);
    color: #ffffff;
}

.faq-hero h1 {
    font-size: 3rem;
    margin-bottom: 1rem;
}

.faq-hero p {
    font-size: 1.15rem;
    opacity: 0.85;
    max-width: 640px;
    margin: 0 auto 2rem;
}

.faq-search input {
    width: 100%;
    max-width: 560px;
    padding: 1rem 1.25rem;
    border: none;
    border-radius: 999px;
    font-size: 1rem;
    box-shadow: 0 8px 24px rgba(0, 0, 0, 0.15);
}

.faq-toolbar {
    max-width: 800px;
    margin: 2rem auto 0;
    padding: 0 2rem;
    display: flex;
    justify-content: flex-end;
    gap: 0.75rem;
}

.faq-toolbar-button {
    background: none;
    border: 1px solid #c9d2e3;
    border-radius: 8px;
    padding: 0.5rem 1rem;
    cursor: pointer;
    color: #3b4760;
}

.faq-toolbar-button:disabled {
    opacity: 0.5;
    cursor: default;
}

.faq-search.searching input {
    box-shadow: 0 8px 24px rgba(25, 135, 84, 0.35);
}

.faq-toolbar-button:hover {
    border-color: #198754;
    color: #198754;
}

.faq-content {
    max-width: 800px;
    margin: 0 auto;
    padding: 1rem 2rem;
}

.faq-category h2 {
    font-size: 1.75rem;
    margin: 2.5rem 0 1rem;
}

.faq-item {
    background: #ffffff;
    border: 1px solid #e3e7f0;
    border-radius: 12px;
    margin-bottom: 0.75rem;
    overflow: hidden;
    transition: border-color 0.3s ease;
}

.faq-item.open {
    border-color: #198754;
}

.faq-question {
    width: 100%;
    padding: 1.25rem 1.5rem;
    background: none;
    border: none;
    font-size: 1.1rem;
    text-align: left;
    cursor: pointer;
    display: flex;
    justify-content: space-between;
    align-items: center;
    color: inherit;
}

.faq-question:focus-visible {
    outline: 2px solid #198754;
    outline-offset: -2px;
}

.faq-question mark {
    background: #ffe58f;
    border-radius: 3px;
    padding: 0 2px;
}

.toggle-icon {
    font-size: 1.5rem;
    color: #198754;
    transition: transform 0.3s ease;
}

.faq-item.open .toggle-icon {
    transform: rotate(180deg);
}

.faq-answer {
    max-height: 0;
    overflow: hidden;
    transition: max-height 0.4s ease;
    padding: 0 1.5rem;
}

.faq-item.open .faq-answer {
    max-height: 1000px;
    padding: 0 1.5rem 1.25rem;
}

.faq-answer p {
    color: #56617a;
    line-height: 1.6;
    margin: 0;
}

.faq-no-results {
    text-align: center;
    padding: 3rem 1rem;
}

.faq-no-results__icon {
    font-size: 2.5rem;
}

.faq-no-results__text a {
    color: #198754;
}

@media (max-width: 768px) {
    .faq-hero h1 {
        font-size: 2.25rem;
    }

    .faq-content,
    .faq-toolbar {
        padding: 0 1rem;
    }
}

@media print {
    .faq-search,
    .faq-toolbar {
        display: none;
    }

    .faq-item .faq-answer {
        max-height: none;
    }
}
"#;

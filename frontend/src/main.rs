use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, Level};

mod config;
mod faq {
    pub mod analytics;
    pub mod catalog;
    pub mod controller;
    pub mod debounce;
    pub mod deep_link;
    pub mod highlight;
    pub mod keyboard;
}
mod pages {
    pub mod faq;
    pub mod not_found;
}

use pages::{
    faq::FaqPage,
    not_found::NotFound,
};


#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/faq")]
    Faq,
    #[not_found]
    #[at("/404")]
    NotFound,
}


fn switch(routes: Route) -> Html {
    match routes {
        Route::Home | Route::Faq => {
            info!("Rendering FAQ page");
            html! { <FaqPage /> }
        },
        Route::NotFound => {
            info!("Rendering NotFound page");
            html! { <NotFound /> }
        },
    }
}


#[function_component]
fn App() -> Html {
    html! {
        <BrowserRouter>
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}

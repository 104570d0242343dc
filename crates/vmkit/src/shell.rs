//! Headless shell
//!
//! Boots the composition root without a UI and drives it with a navigation
//! script. Each registered route pushes a page onto the in-memory
//! [`PageStack`] and announces it over the messenger; a history view-model
//! listens for those announcements.
//!
//! The last shown page is stored in settings, so with the file backend a
//! second run reports where the previous one ended.
//!
//! [`PageStack`]: vmkit_infrastructure::navigation::PageStack

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use vmkit_domain::NavigationRequest;
use vmkit_domain::error::{Error, Result};
use vmkit_domain::ports::dispatcher::UiDispatcher;
use vmkit_domain::ports::messenger::{Receive, Registrations, Subscriber};
use vmkit_domain::ports::navigation::Navigator;
use vmkit_domain::ports::routing::{RouteAction, RouteTable};
use vmkit_infrastructure::config::{AppConfig, ConfigLoader};
use vmkit_infrastructure::di::{AppContext, init_app};
use vmkit_infrastructure::logging::{init_logging, log_app_config};
use vmkit_infrastructure::view_model::ViewModelBase;

/// Settings key holding the page shown when the last script ended
pub const LAST_PAGE_KEY: &str = "shell.last_page";

/// Script step returning to the previous page
const BACK_STEP: &str = "back";

/// What to run
#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    /// Configuration file; default lookup when `None`
    pub config_path: Option<PathBuf>,
    /// Paths to register; every path in `steps` when empty
    pub routes: Vec<String>,
    /// Route paths or `back`
    pub steps: Vec<String>,
}

/// Outcome of a script run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellReport {
    /// Page history after the script, bottom first
    pub pages: Vec<String>,
    /// Pages announced over the messenger, in order
    pub shown: Vec<String>,
    /// Back steps that actually left a page
    pub back_steps: usize,
    /// Property change notifications raised by the history view-model
    pub property_changes: usize,
    /// Last page stored by a previous run
    pub previous_last_page: Option<String>,
    /// Settings backend in use
    pub settings_backend: String,
}

/// Announced by a route action after its page is on top
#[derive(Debug, Clone)]
pub struct PageShown {
    /// Page name
    pub page: String,
    /// Route path that led to the page
    pub path: String,
}

/// View-model tracking which pages were shown
pub struct HistoryViewModel {
    base: ViewModelBase,
    shown: Mutex<Vec<String>>,
    current: Mutex<Option<String>>,
}

impl HistoryViewModel {
    /// Create the view-model notifying on `dispatcher`
    pub fn new(dispatcher: Arc<dyn UiDispatcher>) -> Arc<Self> {
        Arc::new(Self {
            base: ViewModelBase::new(dispatcher),
            shown: Mutex::default(),
            current: Mutex::default(),
        })
    }

    /// Change notification base
    pub fn base(&self) -> &ViewModelBase {
        &self.base
    }

    /// Pages shown so far
    pub fn shown(&self) -> Vec<String> {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recently shown page
    pub fn current(&self) -> Option<String> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Receive<PageShown> for HistoryViewModel {
    async fn receive(&self, message: Arc<PageShown>) -> Result<()> {
        debug!(page = %message.page, path = %message.path, "Page shown");
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.page.clone());
        self.base
            .set_locked(&self.current, Some(message.page.clone()), "current_page");
        Ok(())
    }
}

impl Subscriber for HistoryViewModel {
    fn declare(registrations: &mut Registrations<Self>) {
        registrations.receive::<PageShown>();
    }
}

/// Parse one script step
pub fn parse_step(step: &str) -> Result<NavigationRequest> {
    let step = step.trim();
    if step.is_empty() {
        return Err(Error::invalid_argument("Navigation step cannot be empty"));
    }
    if step.eq_ignore_ascii_case(BACK_STEP) {
        Ok(NavigationRequest::Back)
    } else {
        Ok(NavigationRequest::path(step))
    }
}

/// Page name for a route path: its last segment, or `Home` for `/`
pub fn page_name(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or("Home")
        .to_string()
}

fn register_page(context: &AppContext, path: &str) -> Result<()> {
    let page = page_name(path);
    let pages = context.page_stack();
    let messenger = context.messenger();
    let route = path.to_string();
    let action = RouteAction::from_async(move || {
        let pages = pages.clone();
        let messenger = messenger.clone();
        let shown = PageShown {
            page: page.clone(),
            path: route.clone(),
        };
        async move {
            pages.push(shown.page.clone());
            messenger.publish_and_wait(shown).await
        }
    });
    context.routes().register_path(path, action)
}

/// Run a script against an already loaded configuration
pub async fn run_script(config: AppConfig, options: &ShellOptions) -> Result<ShellReport> {
    let requests = options
        .steps
        .iter()
        .map(|step| parse_step(step))
        .collect::<Result<Vec<_>>>()?;

    let context = init_app(config)?;
    let history = HistoryViewModel::new(context.dispatcher());
    history.base.subscribe_to(&context.messenger(), &history)?;
    let property_changes = Arc::new(AtomicUsize::new(0));
    let counter = property_changes.clone();
    history.base.on_property_changed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut routes: Vec<String> = Vec::new();
    if options.routes.is_empty() {
        for request in &requests {
            if let NavigationRequest::Path(path) = request {
                if !routes.contains(path) {
                    routes.push(path.clone());
                }
            }
        }
    } else {
        routes.clone_from(&options.routes);
    }
    for path in &routes {
        register_page(&context, path)?;
    }
    info!("Registered {} routes, running {} steps", routes.len(), requests.len());

    let navigator = context.navigator();
    let mut back_steps = 0;
    for request in requests {
        debug!(%request, "Running step");
        if request.is_back() {
            if navigator.go_back().await? {
                back_steps += 1;
            }
        } else {
            navigator.request(request).await?;
        }
    }

    let settings = context.settings();
    let previous_last_page = settings.try_get::<String>(LAST_PAGE_KEY).await?;
    if let Some(page) = context.page_stack().current() {
        settings.set(LAST_PAGE_KEY, &page).await?;
    }

    Ok(ShellReport {
        pages: context.page_stack().pages(),
        shown: history.shown(),
        back_steps,
        property_changes: property_changes.load(Ordering::SeqCst),
        previous_last_page,
        settings_backend: settings.backend_name().to_string(),
    })
}

/// Load configuration from optional path
fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load()
}

/// Run the shell: load configuration, install logging, run the script
pub async fn run_shell(
    options: &ShellOptions,
) -> std::result::Result<ShellReport, Box<dyn std::error::Error>> {
    let config = load_config(options.config_path.as_deref())?;
    init_logging(config.logging.clone())?;
    log_app_config(&config);
    info!(steps = options.steps.len(), "Starting vmkit shell");
    Ok(run_script(config, options).await?)
}

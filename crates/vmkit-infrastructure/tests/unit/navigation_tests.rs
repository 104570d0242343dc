//! Navigation service and page stack tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vmkit_domain::NavigationRequest;
use vmkit_domain::error::Error;
use vmkit_domain::ports::navigation::{Navigator, PlatformNavigator};
use vmkit_domain::ports::routing::{RouteAction, RouteTable};
use vmkit_infrastructure::config::NavigationConfig;
use vmkit_infrastructure::navigation::{NavigationService, PageStack};
use vmkit_infrastructure::routing::RouteRegistry;

fn counting_action(calls: &Arc<AtomicUsize>) -> RouteAction {
    let calls = calls.clone();
    RouteAction::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn service(routes: &Arc<RouteRegistry>, pages: &Arc<PageStack>) -> NavigationService {
    NavigationService::new(routes.clone(), pages.clone())
}

#[tokio::test]
async fn test_navigate_invokes_only_the_registered_action() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::with_root("Main"));
    let page2 = Arc::new(AtomicUsize::new(0));
    let page3 = Arc::new(AtomicUsize::new(0));
    routes
        .register_path("/Page2", counting_action(&page2))
        .unwrap();
    routes
        .register_path("/Page3", counting_action(&page3))
        .unwrap();

    service(&routes, &pages).navigate("/Page2").await.unwrap();

    assert_eq!(page2.load(Ordering::SeqCst), 1);
    assert_eq!(page3.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_navigate_unknown_path_fails_without_side_effects() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::with_root("Main"));
    let calls = Arc::new(AtomicUsize::new(0));
    routes
        .register_path("/Page2", counting_action(&calls))
        .unwrap();

    let err = service(&routes, &pages)
        .navigate("/Nowhere")
        .await
        .unwrap_err();

    match err {
        Error::RouteNotFound { path } => assert_eq!(path, "/Nowhere"),
        other => panic!("expected route not found, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(pages.depth(), 1);
}

#[tokio::test]
async fn test_unknown_path_can_be_ignored_by_config() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::new());
    let config = NavigationConfig {
        ignore_unknown_routes: true,
    };
    let navigator = NavigationService::from_config(&config, routes, pages);

    navigator.navigate("/Nowhere").await.unwrap();
}

#[tokio::test]
async fn test_action_error_reaches_caller() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::new());
    routes
        .register("/Broken", || Err(Error::navigation("page failed to load")))
        .unwrap();

    let err = service(&routes, &pages)
        .navigate("/Broken")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Navigation { .. }));
}

#[tokio::test]
async fn test_navigation_pushes_and_back_pops() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::with_root("Main"));
    let target = pages.clone();
    routes
        .register("/Settings", move || {
            target.push("Settings");
            Ok(())
        })
        .unwrap();
    let navigator = service(&routes, &pages);

    assert!(!navigator.can_go_back());
    navigator.navigate("/Settings").await.unwrap();
    assert_eq!(pages.current().as_deref(), Some("Settings"));
    assert!(navigator.can_go_back());

    assert!(navigator.go_back().await.unwrap());
    assert_eq!(pages.current().as_deref(), Some("Main"));
    assert!(!navigator.go_back().await.unwrap());
}

#[tokio::test]
async fn test_back_works_with_no_routes() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::with_root("Main"));
    pages.push("Details");

    let navigator = service(&routes, &pages);
    assert!(navigator.go_back().await.unwrap());
    assert_eq!(pages.pages(), vec!["Main"]);
    assert!(routes.is_empty());
}

#[tokio::test]
async fn test_request_dispatches_both_forms() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::with_root("Main"));
    let target = pages.clone();
    routes
        .register("/About", move || {
            target.push("About");
            Ok(())
        })
        .unwrap();
    let navigator = service(&routes, &pages);

    navigator
        .request(NavigationRequest::Path("/About".to_string()))
        .await
        .unwrap();
    assert_eq!(pages.depth(), 2);

    navigator.request(NavigationRequest::Back).await.unwrap();
    assert_eq!(pages.depth(), 1);
}

#[tokio::test]
async fn test_each_navigation_resolves_afresh() {
    let routes = RouteRegistry::new_shared();
    let pages = Arc::new(PageStack::new());
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let navigator = service(&routes, &pages);

    routes.register_path("/Page", counting_action(&first)).unwrap();
    navigator.navigate("/Page").await.unwrap();
    routes
        .register_path("/Page", counting_action(&second))
        .unwrap();
    navigator.navigate("/Page").await.unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_page_stack_keeps_bottom_page() {
    let pages = PageStack::new();
    assert!(pages.current().is_none());
    assert!(!pages.go_back().await.unwrap());

    pages.push("Only");
    assert!(!pages.can_go_back());
    assert!(pages.pop().is_none());
    assert_eq!(pages.depth(), 1);
}

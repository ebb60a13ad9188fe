use repo_browser::deep_link::DEFAULT_SCHEME;
use repo_browser::{DeepLinkHandler, DeepLinkRouter, DeepLinkTarget, RouteOutcome};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingTarget {
    links: Mutex<Vec<String>>,
}

impl RecordingTarget {
    fn links(&self) -> Vec<String> {
        self.links.lock().unwrap().clone()
    }
}

impl DeepLinkTarget for RecordingTarget {
    fn receive_deep_link(&self, link: &str) {
        self.links.lock().unwrap().push(link.to_string());
    }
}

#[test]
fn test_can_route_recognizes_application_scheme() {
    let router = DeepLinkRouter::new(DEFAULT_SCHEME);

    assert!(router.can_route("sporty://open?x=1"));
    assert!(!router.can_route("https://example.com"));
    assert!(router.can_open("sporty://repo/swift"));
}

#[test]
fn test_route_delivers_raw_uri_to_bound_target() {
    let router = DeepLinkRouter::default();
    let target = Arc::new(RecordingTarget::default());
    router.bind(&target);

    let outcome = router.route("sporty://open?x=1&y=two");

    assert_eq!(outcome, RouteOutcome::Delivered);
    assert_eq!(target.links(), vec!["sporty://open?x=1&y=two".to_string()]);
}

#[test]
fn test_unrecognized_uri_is_not_delivered() {
    let router = DeepLinkRouter::default();
    let target = Arc::new(RecordingTarget::default());
    router.bind(&target);

    assert_eq!(router.route("https://example.com"), RouteOutcome::Unrecognized);
    assert_eq!(router.open("mailto:someone@example.com"), RouteOutcome::Unrecognized);
    assert!(target.links().is_empty());
}

#[test]
fn test_route_without_target_drops_link() {
    let router = DeepLinkRouter::default();

    assert_eq!(router.route("sporty://open"), RouteOutcome::NoTarget);

    // Binding afterwards does not replay the dropped link.
    let target = Arc::new(RecordingTarget::default());
    router.bind(&target);
    assert!(target.links().is_empty());

    router.route("sporty://second");
    assert_eq!(target.links(), vec!["sporty://second".to_string()]);
}

#[test]
fn test_router_does_not_keep_target_alive() {
    let router = DeepLinkRouter::default();
    let target = Arc::new(RecordingTarget::default());
    router.bind(&target);
    assert!(router.is_bound());
    assert_eq!(Arc::strong_count(&target), 1);

    drop(target);

    assert!(!router.is_bound());
    assert_eq!(router.route("sporty://open"), RouteOutcome::NoTarget);
}

#[test]
fn test_unbind_and_rebind() {
    let router = DeepLinkRouter::new("myapp");
    let first = Arc::new(RecordingTarget::default());
    let second = Arc::new(RecordingTarget::default());

    router.bind(&first);
    router.route("myapp://a");
    router.unbind();
    assert_eq!(router.route("myapp://b"), RouteOutcome::NoTarget);
    router.bind(&second);
    router.route("myapp://c");

    assert_eq!(router.scheme(), "myapp");
    assert_eq!(first.links(), vec!["myapp://a".to_string()]);
    assert_eq!(second.links(), vec!["myapp://c".to_string()]);
}

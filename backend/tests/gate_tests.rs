use dashboard_portal::gate::{
    Decision, RouteClass, RouteMatching, classify, decide, decide_with,
};

// --- Scenarios ---

#[test]
fn test_dashboard_subpage_without_cookie_redirects_to_login() {
    assert_eq!(decide("/dashboard/settings", false), Decision::RedirectToLogin);
}

#[test]
fn test_dashboard_subpage_with_cookie_is_allowed() {
    assert_eq!(decide("/dashboard/anything", true), Decision::Allow);
    assert_eq!(decide("/dashboard", true), Decision::Allow);
}

#[test]
fn test_auth_pages_with_cookie_redirect_to_dashboard() {
    assert_eq!(decide("/login", true), Decision::RedirectToDashboard);
    assert_eq!(decide("/register", true), Decision::RedirectToDashboard);
}

#[test]
fn test_auth_pages_without_cookie_are_allowed() {
    assert_eq!(decide("/login", false), Decision::Allow);
    assert_eq!(decide("/register", false), Decision::Allow);
}

#[test]
fn test_other_paths_are_always_allowed() {
    let paths = ["/", "/about", "/health", "/api/login", "/Dashboard", "", "dashboard", "/logout"];

    for path in paths {
        for has_cookie in [true, false] {
            assert_eq!(
                decide(path, has_cookie),
                Decision::Allow,
                "path {:?} with cookie={} should pass through",
                path,
                has_cookie
            );
        }
    }
}

#[test]
fn test_prefix_matching_catches_lookalike_paths() {
    // Plain prefix test: anything starting with "/login" counts as the login page.
    assert_eq!(decide("/loginhelp", true), Decision::RedirectToDashboard);
    assert_eq!(decide("/registered", true), Decision::RedirectToDashboard);
    assert_eq!(decide("/dashboards", false), Decision::RedirectToLogin);
}

#[test]
fn test_decide_is_deterministic() {
    for (path, has_cookie) in [("/login", true), ("/dashboard/x", false), ("/about", true)] {
        assert_eq!(decide(path, has_cookie), decide(path, has_cookie));
    }
}

// --- Classification ---

#[test]
fn test_classify_prefix() {
    assert_eq!(classify("/login", RouteMatching::Prefix), RouteClass::AuthPage);
    assert_eq!(classify("/register/step-2", RouteMatching::Prefix), RouteClass::AuthPage);
    assert_eq!(classify("/dashboard/orders", RouteMatching::Prefix), RouteClass::ProtectedPage);
    assert_eq!(classify("/about", RouteMatching::Prefix), RouteClass::Other);
}

#[test]
fn test_segment_matching_rejects_lookalike_paths() {
    assert_eq!(classify("/loginhelp", RouteMatching::Segment), RouteClass::Other);
    assert_eq!(classify("/dashboards", RouteMatching::Segment), RouteClass::Other);
    assert_eq!(
        decide_with("/loginhelp", true, RouteMatching::Segment),
        Decision::Allow
    );
}

#[test]
fn test_segment_matching_keeps_real_routes() {
    assert_eq!(classify("/login", RouteMatching::Segment), RouteClass::AuthPage);
    assert_eq!(classify("/login/", RouteMatching::Segment), RouteClass::AuthPage);
    assert_eq!(classify("/dashboard", RouteMatching::Segment), RouteClass::ProtectedPage);
    assert_eq!(
        decide_with("/dashboard/settings", false, RouteMatching::Segment),
        Decision::RedirectToLogin
    );
    assert_eq!(
        decide_with("/register", true, RouteMatching::Segment),
        Decision::RedirectToDashboard
    );
}

#[test]
fn test_redirect_targets() {
    assert_eq!(Decision::Allow.redirect_target(), None);
    assert_eq!(Decision::RedirectToLogin.redirect_target(), Some("/login"));
    assert_eq!(Decision::RedirectToDashboard.redirect_target(), Some("/dashboard"));
}

#[test]
fn test_route_matching_parse() {
    assert_eq!(RouteMatching::parse("prefix"), Some(RouteMatching::Prefix));
    assert_eq!(RouteMatching::parse(" Segment "), Some(RouteMatching::Segment));
    assert_eq!(RouteMatching::parse("regex"), None);
    assert_eq!(RouteMatching::default(), RouteMatching::Prefix);
}

//! Session guard. The identity provider is opaque: the client only asks
//! whether its state has loaded and whether a session is active, and turns
//! the answer into a redirect decision for the requested route.

/// Source of the "is a session active" signal.
pub trait SessionProvider: Send + Sync {
    /// False while the provider is still restoring its state.
    fn is_loaded(&self) -> bool;

    fn is_active(&self) -> bool;

    fn state(&self) -> SessionState {
        match (self.is_loaded(), self.is_active()) {
            (false, _)    => SessionState::Loading,
            (true, true)  => SessionState::SignedIn,
            (true, false) => SessionState::SignedOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    SignIn,
    SignUp,
    AuthCallback,
    Dashboard,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Landing      => "/",
            Route::SignIn       => "/sign-in",
            Route::SignUp       => "/sign-up",
            Route::AuthCallback => "/auth-callback",
            Route::Dashboard    => "/dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session state not known yet; show nothing and ask again later.
    Pending,
    Allow,
    Redirect(Route),
}

/// Decide what to do with a request for `route`.
pub fn resolve_route(route: Route, session: &dyn SessionProvider) -> RouteDecision {
    let state = session.state();
    if state == SessionState::Loading {
        return RouteDecision::Pending;
    }
    let signed_in = state == SessionState::SignedIn;

    match route {
        Route::AuthCallback if signed_in              => RouteDecision::Redirect(Route::Dashboard),
        Route::AuthCallback                           => RouteDecision::Redirect(Route::SignIn),
        Route::SignIn | Route::SignUp if signed_in    => RouteDecision::Redirect(Route::Dashboard),
        Route::Dashboard if !signed_in                => RouteDecision::Redirect(Route::SignIn),
        _                                             => RouteDecision::Allow,
    }
}

/// Fixed answer, for a session resolved up front (e.g. from a token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSession {
    active: bool,
}

impl StaticSession {
    pub fn new(active: bool) -> Self {
        Self { active }
    }
}

impl SessionProvider for StaticSession {
    fn is_loaded(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loading;

    impl SessionProvider for Loading {
        fn is_loaded(&self) -> bool {
            false
        }

        fn is_active(&self) -> bool {
            true
        }
    }

    const ALL_ROUTES: [Route; 5] = [
        Route::Landing,
        Route::SignIn,
        Route::SignUp,
        Route::AuthCallback,
        Route::Dashboard,
    ];

    #[test]
    fn test_loading_is_pending_everywhere() {
        for route in ALL_ROUTES {
            assert_eq!(resolve_route(route, &Loading), RouteDecision::Pending);
        }
    }

    #[test]
    fn test_signed_in_routes() {
        let s = StaticSession::new(true);
        assert_eq!(resolve_route(Route::AuthCallback, &s), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(resolve_route(Route::SignIn, &s), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(resolve_route(Route::SignUp, &s), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(resolve_route(Route::Dashboard, &s), RouteDecision::Allow);
        assert_eq!(resolve_route(Route::Landing, &s), RouteDecision::Allow);
    }

    #[test]
    fn test_signed_out_routes() {
        let s = StaticSession::new(false);
        assert_eq!(resolve_route(Route::AuthCallback, &s), RouteDecision::Redirect(Route::SignIn));
        assert_eq!(resolve_route(Route::Dashboard, &s), RouteDecision::Redirect(Route::SignIn));
        assert_eq!(resolve_route(Route::SignIn, &s), RouteDecision::Allow);
        assert_eq!(resolve_route(Route::SignUp, &s), RouteDecision::Allow);
        assert_eq!(resolve_route(Route::Landing, &s), RouteDecision::Allow);
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Dashboard.as_str(), "/dashboard");
        assert_eq!(Route::AuthCallback.as_str(), "/auth-callback");
    }
}

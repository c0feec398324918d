//! Item activation: hand the route to the router, then decide what the rail does.

use serde::{Deserialize, Serialize};

use crate::models::{NavigationItem, RouteId};

/// Capability that performs a route change
///
/// The rail only requests navigation. Whatever the router does with the
/// request, including failing, is not observed here. Any `Fn(&RouteId)`
/// closure is a navigator.
pub trait Navigator {
    /// Request a change to `route`
    fn navigate(&self, route: &RouteId);
}

impl<F> Navigator for F
where
    F: Fn(&RouteId),
{
    fn navigate(&self, route: &RouteId) {
        self(route)
    }
}

/// What the rail does after an item has been activated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostActivationPolicy {
    /// Collapse fully, clear the bounce and stop all timers
    #[default]
    Collapse,
    /// Keep the current tier and restart the idle cascade
    RestartCascade,
}

impl std::str::FromStr for PostActivationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collapse" => Ok(PostActivationPolicy::Collapse),
            "restart" | "restart_cascade" | "restart-cascade" => {
                Ok(PostActivationPolicy::RestartCascade)
            }
            other => Err(format!("unknown post-activation policy: {}", other)),
        }
    }
}

/// Pass-through from item selection to the injected navigator
#[derive(Debug)]
pub struct RouteActivationGate<N> {
    navigator: N,
    policy: PostActivationPolicy,
}

impl<N: Navigator> RouteActivationGate<N> {
    /// Create a gate around a navigator
    pub fn new(navigator: N, policy: PostActivationPolicy) -> Self {
        Self { navigator, policy }
    }

    /// Configured post-activation policy
    pub fn policy(&self) -> PostActivationPolicy {
        self.policy
    }

    /// Navigate to the item's route exactly once and return the policy to apply
    ///
    /// No retry, no de-duplication of rapid repeats, no queuing.
    pub fn activate(&self, item: &NavigationItem) -> PostActivationPolicy {
        tracing::info!("[rail] navigating to {} ({})", item.route_id, item.label);
        self.navigator.navigate(&item.route_id);
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Icon;
    use std::cell::RefCell;

    #[test]
    fn test_activate_calls_navigator_once_per_activation() {
        let calls = RefCell::new(Vec::new());
        let gate = RouteActivationGate::new(
            |route: &RouteId| calls.borrow_mut().push(route.clone()),
            PostActivationPolicy::RestartCascade,
        );
        let item = NavigationItem::new("DOAJ", "/doaj", Icon::BookOpen);

        assert_eq!(gate.activate(&item), PostActivationPolicy::RestartCascade);
        assert_eq!(gate.activate(&item), PostActivationPolicy::RestartCascade);
        assert_eq!(
            calls.borrow().as_slice(),
            &[RouteId::from("/doaj"), RouteId::from("/doaj")]
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "collapse".parse::<PostActivationPolicy>(),
            Ok(PostActivationPolicy::Collapse)
        );
        assert_eq!(
            "Restart".parse::<PostActivationPolicy>(),
            Ok(PostActivationPolicy::RestartCascade)
        );
        assert!("bogus".parse::<PostActivationPolicy>().is_err());
    }

    #[test]
    fn test_default_policy_collapses() {
        assert_eq!(PostActivationPolicy::default(), PostActivationPolicy::Collapse);
    }
}

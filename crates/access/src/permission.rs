//! Permission levels and the highest-wins merge rule.

use serde::{Deserialize, Serialize};

/// Permission granted on a module.
///
/// Ordered `View < Custom < Manage`. `Custom` sits between the two well-known
/// levels for merge purposes only.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    View,
    Custom,
    Manage,
}

impl PermissionType {
    /// Merge an incoming grant into the value already stored for a module.
    ///
    /// `Manage` always wins, `Custom` replaces `View`, anything else leaves the
    /// stored value untouched. The result does not depend on arrival order.
    pub fn merge(self, incoming: PermissionType) -> PermissionType {
        match (self, incoming) {
            (_, PermissionType::Manage) => PermissionType::Manage,
            (PermissionType::View, PermissionType::Custom) => PermissionType::Custom,
            (stored, _) => stored,
        }
    }

    /// Merge into an optional slot (first grant for a module is stored as-is).
    pub fn merge_into(slot: &mut Option<PermissionType>, incoming: PermissionType) {
        *slot = Some(match *slot {
            None => incoming,
            Some(stored) => stored.merge(incoming),
        });
    }

    /// Whether holding `self` is enough for an operation that needs `required`.
    pub fn satisfies(self, required: PermissionType) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionType::View => "VIEW",
            PermissionType::Custom => "CUSTOM",
            PermissionType::Manage => "MANAGE",
        }
    }
}

impl core::fmt::Display for PermissionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use super::PermissionType::*;

    fn any_permission() -> impl Strategy<Value = PermissionType> {
        prop_oneof![Just(View), Just(Custom), Just(Manage)]
    }

    fn fold(grants: &[PermissionType]) -> Option<PermissionType> {
        let mut slot = None;
        for g in grants {
            PermissionType::merge_into(&mut slot, *g);
        }
        slot
    }

    #[test]
    fn manage_always_wins() {
        assert_eq!(View.merge(Manage), Manage);
        assert_eq!(Custom.merge(Manage), Manage);
        assert_eq!(Manage.merge(View), Manage);
        assert_eq!(Manage.merge(Custom), Manage);
    }

    #[test]
    fn custom_outranks_view_only() {
        assert_eq!(View.merge(Custom), Custom);
        assert_eq!(Custom.merge(View), Custom);
    }

    #[test]
    fn first_grant_is_stored_verbatim() {
        let mut slot = None;
        PermissionType::merge_into(&mut slot, Custom);
        assert_eq!(slot, Some(Custom));
    }

    #[test]
    fn satisfies_follows_ordering() {
        assert!(Manage.satisfies(View));
        assert!(Custom.satisfies(View));
        assert!(!View.satisfies(Custom));
        assert!(!Custom.satisfies(Manage));
    }

    #[test]
    fn serializes_as_screaming_case() {
        assert_eq!(serde_json::to_string(&Manage).unwrap(), "\"MANAGE\"");
        let p: PermissionType = serde_json::from_str("\"CUSTOM\"").unwrap();
        assert_eq!(p, Custom);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the merged value is the maximum of the inputs.
        #[test]
        fn merge_yields_maximum(grants in prop::collection::vec(any_permission(), 1..20)) {
            let expected = grants.iter().copied().max();
            prop_assert_eq!(fold(&grants), expected);
        }

        /// Property: reversing (or rotating) the input does not change the result.
        #[test]
        fn merge_is_order_independent(
            grants in prop::collection::vec(any_permission(), 1..20),
            shift in 0usize..20,
        ) {
            let mut reversed = grants.clone();
            reversed.reverse();
            let mut rotated = grants.clone();
            let len = rotated.len();
            rotated.rotate_left(shift % len);

            prop_assert_eq!(fold(&grants), fold(&reversed));
            prop_assert_eq!(fold(&grants), fold(&rotated));
        }
    }
}

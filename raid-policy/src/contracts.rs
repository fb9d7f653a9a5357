//! Request contracts handed to the engine by damage and interaction hooks.

use raid_primitives::{ActorId, Position, TargetId, Timestamp};
use serde::{Deserialize, Serialize};

const PROTECTED_KEYWORDS: &[&str] = &[
    "wall",
    "foundation",
    "floor",
    "door",
    "window",
    "roof",
    "ladder",
    "gate",
    "barricade",
    "turret",
];

/// Returns `true` for structures covered by raid blocking.
///
/// Building blocks always qualify; anything else qualifies when its prefab name
/// contains a structural keyword.
#[must_use]
pub fn is_raid_protectable(prefab_name: &str, is_building_block: bool) -> bool {
    if is_building_block {
        return true;
    }
    let lower = prefab_name.to_ascii_lowercase();
    PROTECTED_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

/// Who or what receives the action on the spatial axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Victim {
    /// Another live actor (or the attacker itself).
    Actor {
        /// Identifier of the receiving actor.
        id: ActorId,
    },
    /// A placed structure, optionally owned.
    Structure {
        /// Owner, when the structure has one.
        owner: Option<ActorId>,
    },
    /// An NPC. Either side being an NPC bypasses zone rules.
    Npc,
    /// Loot containers and collectibles.
    Environment,
}

/// The action being decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyAction {
    /// Structure damage evaluated against the raid-block window.
    Raid {
        /// Whether the actor holds building privilege over the target.
        authorized: bool,
        /// Whether the target is a raid-protectable structure.
        protectable: bool,
    },
    /// Actor interaction gated by spatial zones.
    Interact {
        /// Receiver of the interaction.
        victim: Victim,
    },
}

impl PolicyAction {
    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Raid { authorized, .. } => format!("raid (authorized={authorized})"),
            Self::Interact { victim } => match victim {
                Victim::Actor { id } => format!("interact with actor `{id}`"),
                Victim::Structure { owner: Some(owner) } => {
                    format!("interact with structure owned by `{owner}`")
                }
                Victim::Structure { owner: None } => "interact with unowned structure".into(),
                Victim::Npc => "interact with npc".into(),
                Victim::Environment => "interact with environment".into(),
            },
        }
    }
}

/// Per-decision inputs. `now` is read once by the caller and threaded through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyContext {
    now: Timestamp,
    position: Position,
    actor_id: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_id: Option<TargetId>,
}

impl PolicyContext {
    /// Creates a context with no known target.
    #[must_use]
    pub const fn new(now: Timestamp, position: Position, actor_id: ActorId) -> Self {
        Self {
            now,
            position,
            actor_id,
            target_id: None,
        }
    }

    /// Attaches the target whose exceptions apply.
    #[must_use]
    pub const fn with_target(mut self, target_id: TargetId) -> Self {
        self.target_id = Some(target_id);
        self
    }

    /// Decision instant.
    #[must_use]
    pub const fn now(&self) -> Timestamp {
        self.now
    }

    /// Where the action happens.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Acting actor.
    #[must_use]
    pub const fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// Known target, if any.
    #[must_use]
    pub const fn target_id(&self) -> Option<TargetId> {
        self.target_id
    }
}

/// Full request sent to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyRequest {
    context: PolicyContext,
    action: PolicyAction,
}

impl PolicyRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(context: PolicyContext, action: PolicyAction) -> Self {
        Self { context, action }
    }

    /// Raid attempt on a protectable structure.
    #[must_use]
    pub const fn raid(context: PolicyContext, authorized: bool) -> Self {
        Self::new(
            context,
            PolicyAction::Raid {
                authorized,
                protectable: true,
            },
        )
    }

    /// Raid attempt classified from the target's prefab name.
    #[must_use]
    pub fn raid_on_prefab(
        context: PolicyContext,
        prefab_name: &str,
        is_building_block: bool,
        authorized: bool,
    ) -> Self {
        Self::new(
            context,
            PolicyAction::Raid {
                authorized,
                protectable: is_raid_protectable(prefab_name, is_building_block),
            },
        )
    }

    /// Zone-gated interaction.
    #[must_use]
    pub const fn interact(context: PolicyContext, victim: Victim) -> Self {
        Self::new(context, PolicyAction::Interact { victim })
    }

    /// Per-decision inputs.
    #[must_use]
    pub const fn context(&self) -> &PolicyContext {
        &self.context
    }

    /// Action being decided.
    #[must_use]
    pub const fn action(&self) -> &PolicyAction {
        &self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn structures_are_classified_by_keyword() {
        assert!(is_raid_protectable("wall.external.high.stone", false));
        assert!(is_raid_protectable("door.hinged.toptier", false));
        assert!(is_raid_protectable("AutoTurret_Deployed", false));
        assert!(is_raid_protectable("anything", true));
        assert!(!is_raid_protectable("box.wooden.large", false));
        assert!(!is_raid_protectable("furnace", false));
    }

    #[test]
    fn prefab_raid_carries_classification() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 23, 0, 0).unwrap();
        let ctx = PolicyContext::new(now, Position::default(), ActorId::new(7))
            .with_target(TargetId::new(11));
        let request = PolicyRequest::raid_on_prefab(ctx, "furnace", false, false);

        assert_eq!(
            request.action(),
            &PolicyAction::Raid {
                authorized: false,
                protectable: false
            }
        );
        assert_eq!(request.context().target_id(), Some(TargetId::new(11)));
        assert_eq!(request.action().label(), "raid (authorized=false)");
    }

    #[test]
    fn requests_serialize_with_tagged_actions() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let ctx = PolicyContext::new(now, Position::default(), ActorId::new(1));
        let request = PolicyRequest::interact(ctx, Victim::Actor { id: ActorId::new(2) });

        let json = serde_json::to_value(request).unwrap();
        assert_eq!(json["action"]["kind"], "interact");
        assert_eq!(json["action"]["victim"]["kind"], "actor");
        assert_eq!(json["action"]["victim"]["id"], 2);
    }
}

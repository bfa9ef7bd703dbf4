use serde::{Deserialize, Serialize};

/// The fixed catalog of status conditions.
///
/// Declaration order is catalog order; sets of conditions iterate in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Stunned,
    Poisoned,
    Burning,
    Frozen,
    Blinded,
    Frightened,
    Prone,
    Invisible,
    Blessed,
    Shielded,
}

/// Display data and rule text for one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub effect: &'static str,
}

impl Condition {
    pub const ALL: [Condition; 10] = [
        Condition::Stunned,
        Condition::Poisoned,
        Condition::Burning,
        Condition::Frozen,
        Condition::Blinded,
        Condition::Frightened,
        Condition::Prone,
        Condition::Invisible,
        Condition::Blessed,
        Condition::Shielded,
    ];

    pub fn info(&self) -> ConditionInfo {
        let (key, label, icon, effect) = match self {
            Self::Stunned => ("stunned", "Stunned", "💫", "Cannot act on their turn"),
            Self::Poisoned => (
                "poisoned",
                "Poisoned",
                "☠️",
                "Disadvantage on attacks and ability checks",
            ),
            Self::Burning => (
                "burning",
                "Burning",
                "🔥",
                "Takes 1d6 fire damage at start of turn",
            ),
            Self::Frozen => ("frozen", "Frozen", "🧊", "Speed reduced to 0"),
            Self::Blinded => (
                "blinded",
                "Blinded",
                "🙈",
                "Disadvantage on attacks, advantage for attackers",
            ),
            Self::Frightened => (
                "frightened",
                "Frightened",
                "😱",
                "Disadvantage on ability checks, cannot move closer",
            ),
            Self::Prone => (
                "prone",
                "Prone",
                "🔻",
                "Disadvantage on attacks, melee attacks against have advantage",
            ),
            Self::Invisible => (
                "invisible",
                "Invisible",
                "👻",
                "Advantage on attacks, disadvantage for attackers",
            ),
            Self::Blessed => ("blessed", "Blessed", "✨", "+1d4 to attacks and saves"),
            Self::Shielded => ("shielded", "Shielded", "🛡️", "+2 AC until next turn"),
        };
        ConditionInfo {
            key,
            label,
            icon,
            effect,
        }
    }

    pub fn key(&self) -> &'static str {
        self.info().key
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }

    /// Look a condition up by its catalog key, case-insensitively.
    pub fn from_key(key: &str) -> Option<Condition> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// The whole catalog in order, for pickers and legends.
    pub fn catalog() -> Vec<ConditionInfo> {
        Self::ALL.iter().map(Condition::info).collect()
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_ten_entries_in_order() {
        let catalog = Condition::catalog();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog[0].key, "stunned");
        assert_eq!(catalog[9].key, "shielded");
    }

    #[test]
    fn keys_round_trip_through_lookup() {
        for condition in Condition::ALL {
            assert_eq!(Condition::from_key(condition.key()), Some(condition));
        }
        assert_eq!(Condition::from_key("Burning"), Some(Condition::Burning));
        assert_eq!(Condition::from_key("petrified"), None);
    }

    #[test]
    fn serde_uses_catalog_keys() {
        let ron_text = ron::to_string(&Condition::Frightened).unwrap();
        assert_eq!(ron_text, "frightened");
    }
}

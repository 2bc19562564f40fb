use serde::{Deserialize, Serialize};
use tracing::warn;

/// Navigation group an entry is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Basic,
    Academic,
    Grading,
    Administration,
}

impl MenuCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Academic => "academic",
            Self::Grading => "grading",
            Self::Administration => "administration",
        }
    }
}

impl core::fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One navigation entry.
///
/// `requires` is a capability fragment checked with the `view` action; an
/// entry without one is always visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub route: String,
    pub category: MenuCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
}

impl MenuItem {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        route: impl Into<String>,
        category: MenuCategory,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            route: route.into(),
            category,
            requires: None,
        }
    }

    pub fn requires(mut self, fragment: impl Into<String>) -> Self {
        self.requires = Some(fragment.into());
        self
    }
}

/// The application's navigation catalog, in rendering order.
pub fn default_menu() -> Vec<MenuItem> {
    use MenuCategory::*;

    vec![
        MenuItem::new("dashboard", "Inicio", "/dashboard", Basic),
        MenuItem::new("grades", "Grados", "/grados", Basic).requires("grados"),
        MenuItem::new("subjects", "Asignaturas", "/asignaturas", Basic).requires("asignaturas"),
        MenuItem::new("teachers", "Docentes", "/docentes", Basic).requires("docentes"),
        MenuItem::new("students", "Estudiantes", "/estudiantes", Basic).requires("estudiantes"),
        MenuItem::new("groups", "Grupos", "/grupos", Basic).requires("grupos"),
        MenuItem::new("years", "Años lectivos", "/anios-lectivos", Academic).requires("años lectivos"),
        MenuItem::new("periods", "Periodos", "/periodos", Academic).requires("periodos"),
        MenuItem::new("enrollments", "Matrículas", "/matriculas", Academic).requires("matriculas"),
        MenuItem::new("assignments", "Asignaciones", "/asignaciones", Academic).requires("asignaciones"),
        MenuItem::new("grade_entry", "Notas", "/notas", Grading).requires("notas"),
        MenuItem::new("report_cards", "Boletines", "/boletines", Grading).requires("boletines"),
        MenuItem::new("users", "Usuarios", "/usuarios", Administration).requires("usuarios"),
        MenuItem::new("permissions", "Permisos", "/permisos", Administration).requires("permisos"),
    ]
}

/// Decode a menu catalog shipped as JSON. Non-array payloads and malformed
/// entries are dropped with a warning.
pub fn items_from_value(value: &serde_json::Value) -> Vec<MenuItem> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("menu payload is not an array; using empty catalog");
        }
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| match MenuItem::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(position, error = %err, "skipping malformed menu item");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_keys_are_unique() {
        let menu = default_menu();
        let mut keys: Vec<&str> = menu.iter().map(|i| i.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), menu.len());
    }

    #[test]
    fn only_dashboard_is_unconditional() {
        let menu = default_menu();
        let open: Vec<&str> = menu
            .iter()
            .filter(|i| i.requires.is_none())
            .map(|i| i.key.as_str())
            .collect();
        assert_eq!(open, ["dashboard"]);
    }

    #[test]
    fn decodes_catalog_leniently() {
        let payload = json!([
            { "key": "notas", "label": "Notas", "route": "/notas", "category": "grading", "requires": "notas" },
            { "key": "broken", "category": "nowhere" },
            { "key": "home", "label": "Inicio", "route": "/", "category": "basic" }
        ]);
        let items = items_from_value(&payload);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].requires.as_deref(), Some("notas"));
        assert_eq!(items[1].requires, None);
        assert!(items_from_value(&json!("menu")).is_empty());
    }

    #[test]
    fn serializes_without_empty_requirement() {
        let json = serde_json::to_value(MenuItem::new("home", "Inicio", "/", MenuCategory::Basic)).unwrap();
        assert_eq!(json, json!({ "key": "home", "label": "Inicio", "route": "/", "category": "basic" }));
    }
}

use crate::{CourseId, ModuleId, UnitId};

/// Snapshot of the content hierarchy a student can build a session from.
///
/// Units group modules; independent modules stand on their own and are the only modules that can
/// be selected directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilters {
    #[serde(default, alias = "units")]
    pub unites: Vec<Unit>,
    #[serde(default)]
    pub independent_modules: Vec<Module>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
}

impl ContentFilters {
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.unites.iter().find(|unit| unit.id == id)
    }

    /// Looks up an independent module. Modules nested under a unit are not returned.
    pub fn independent_module(&self, id: ModuleId) -> Option<&Module> {
        self.independent_modules.iter().find(|module| module.id == id)
    }
}

/// What the student picked in the hierarchy: a whole unit, a single independent module, or
/// nothing yet. Holding both at once is unrepresentable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    Unit(UnitId),
    Module(ModuleId),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn unit(&self) -> Option<UnitId> {
        match self {
            Selection::Unit(id) => Some(*id),
            _ => None,
        }
    }

    pub fn module(&self) -> Option<ModuleId> {
        match self {
            Selection::Module(id) => Some(*id),
            _ => None,
        }
    }
}

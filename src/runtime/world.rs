use std::cell::RefCell;
use std::rc::Rc;

use im::OrdMap;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::ast::value::Value;
use crate::atoms::{AtomRegistry, SharedOutput};
use crate::errors::{Phase, SourceContext, SutraError};
use crate::runtime::eval::{evaluate_program, EvaluationContext};
use crate::runtime::path::Path;
use crate::runtime::scope::ExecutionScope;
use crate::syntax::parse;

// Using a concrete, seedable PRNG for determinism.
type SmallRng = Xoshiro256StarStar;

const PRELUDE_SOURCE: &str = include_str!("../prelude.sutra");

// ============================================================================
// WORLD STATE: Data container for Sutra's ambient globals
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct WorldState {
    data: Value,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            data: Value::Map(OrdMap::new()),
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = &self.data;
        for key in &path.0 {
            let Value::Map(map) = current else { return None };
            current = map.get(key.as_str())?;
        }
        Some(current)
    }

    pub fn set(&mut self, path: &Path, val: Value) {
        if path.is_empty() {
            return;
        }
        self.data = set_recursive(&self.data, &path.0, val);
    }

    pub fn del(&mut self, path: &Path) {
        if path.is_empty() {
            return;
        }
        self.data = del_recursive(&self.data, &path.0);
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Names bound at the top level of the state.
    pub fn top_level_names(&self) -> Vec<String> {
        match &self.data {
            Value::Map(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// WORLD: The ambient global namespace
// ============================================================================

/// Ambient global namespace: nested state plus the PRNG behind `rand`.
///
/// Cloning is cheap because the state map is persistent. The harness builds
/// one template world and hands every test case its own clone, so nothing a
/// case writes here is visible to the next one.
#[derive(Clone, Debug)]
pub struct World {
    pub state: WorldState,
    pub prng: SmallRng,
}

impl World {
    pub fn new() -> Self {
        Self {
            state: WorldState::new(),
            prng: SmallRng::from_entropy(),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            state: WorldState::new(),
            prng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Template world for a harness run: seeded (or entropy-seeded) PRNG with
    /// the prelude loaded into state.
    pub fn standard(atoms: &AtomRegistry, seed: Option<u64>) -> Result<Self, SutraError> {
        let world = match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::new(),
        };
        world.with_prelude(atoms)
    }

    /// Evaluates the bundled prelude and stores each of its top-level
    /// definitions as a global.
    pub fn with_prelude(self, atoms: &AtomRegistry) -> Result<Self, SutraError> {
        let source = SourceContext::from_file("prelude.sutra", PRELUDE_SOURCE);
        let program = parse(&source, Phase::Execution)?;

        let world = Rc::new(RefCell::new(self));
        let scope = Rc::new(RefCell::new(ExecutionScope::new()));
        let mut context = EvaluationContext::new(
            Rc::clone(&world),
            Rc::clone(&scope),
            atoms,
            SharedOutput::default(),
            source,
            Phase::Execution,
        );
        evaluate_program(&program, &mut context)?;
        drop(context);

        let mut world = world.borrow().clone();
        for (name, value) in scope.borrow().bindings() {
            world.set(&Path::single(name.clone()), value.clone());
        }
        tracing::debug!(
            globals = world.state.top_level_names().len(),
            "prelude loaded"
        );
        Ok(world)
    }

    pub fn get(&self, path: &Path) -> Option<&Value> {
        self.state.get(path)
    }

    pub fn set(&mut self, path: &Path, val: Value) {
        self.state.set(path, val);
    }

    pub fn del(&mut self, path: &Path) {
        self.state.del(path);
    }

    pub fn next_u32(&mut self) -> u32 {
        self.prng.next_u32()
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.prng.gen::<f64>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// IMMUTABLE HELPERS: set_recursive, del_recursive
// ============================================================================

// Recursive helper for `set`; intermediate non-map values are replaced.
fn set_recursive(current: &Value, path_segments: &[String], val: Value) -> Value {
    let Some((key, remaining_segments)) = path_segments.split_first() else {
        return current.clone();
    };

    let mut map = match current {
        Value::Map(m) => m.clone(),
        _ => OrdMap::new(),
    };

    if remaining_segments.is_empty() {
        map.insert(key.clone(), val);
    } else {
        let child = map.get(key).cloned().unwrap_or_default();
        let new_child = set_recursive(&child, remaining_segments, val);
        map.insert(key.clone(), new_child);
    }

    Value::Map(map)
}

// Recursive helper for `del`; maps emptied by the removal are pruned.
fn del_recursive(current: &Value, path_segments: &[String]) -> Value {
    let Some((key, remaining_segments)) = path_segments.split_first() else {
        return current.clone();
    };

    let Value::Map(current_map) = current else {
        return current.clone();
    };

    let mut map = current_map.clone();

    if remaining_segments.is_empty() {
        map.remove(key);
    } else if let Some(child) = map.get(key).cloned() {
        let new_child = del_recursive(&child, remaining_segments);
        match &new_child {
            Value::Map(child_map) if child_map.is_empty() => {
                map.remove(key);
            }
            _ => {
                map.insert(key.clone(), new_child);
            }
        }
    }

    Value::Map(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    #[test]
    fn nested_set_get_del() {
        let mut world = World::from_seed(7);
        world.set(&path("stats.calls"), Value::Number(1.0));
        assert_eq!(world.get(&path("stats.calls")), Some(&Value::Number(1.0)));

        world.del(&path("stats.calls"));
        assert!(world.get(&path("stats.calls")).is_none());
        assert!(world.get(&path("stats")).is_none());
    }

    #[test]
    fn clones_do_not_share_writes() {
        let mut template = World::from_seed(7);
        template.set(&path("counter"), Value::Number(0.0));

        let mut copy = template.clone();
        copy.set(&path("counter"), Value::Number(5.0));

        assert_eq!(template.get(&path("counter")), Some(&Value::Number(0.0)));
        assert_eq!(copy.get(&path("counter")), Some(&Value::Number(5.0)));
    }

    #[test]
    fn seeded_worlds_are_deterministic() {
        let mut a = World::from_seed(42);
        let mut b = World::from_seed(42);
        assert_eq!(a.next_u32(), b.next_u32());
    }

    #[test]
    fn prelude_definitions_become_globals() {
        let atoms = AtomRegistry::standard();
        let world = World::standard(&atoms, Some(1)).unwrap();
        for name in ["inc", "dec", "square", "identity", "sum", "product", "zip", "count"] {
            assert!(
                matches!(world.get(&Path::single(name)), Some(Value::Lambda(_))),
                "{name} missing from prelude"
            );
        }
    }
}

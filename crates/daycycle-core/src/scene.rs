//! Scene host seam and the in-memory scene registry.
//!
//! The simulation core never touches presentation state directly. It hands
//! environment updates and schedule transitions to a [`SceneHost`], which
//! is also the [`TargetResolver`] the schedule uses to find objects and
//! discover their components.
//!
//! [`SceneRegistry`] is the headless host: a map of named objects with
//! renderer and collider components, plus the most recent skybox, light
//! and HUD state. It is what the engine binary drives, and what the tests
//! inspect.

use std::collections::BTreeMap;

use daycycle_types::{ComponentId, LightRotation, Materialization, TargetId, TransitionKind};
use tracing::{debug, info, warn};

use crate::config::SceneConfig;
use crate::presentation::{EnvironmentUpdate, SkyboxAssignment};
use crate::schedule::{ScheduleTransition, TargetComponents, TargetResolver};

/// Errors raised while building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Two objects share a name, and therefore a target id.
    #[error("duplicate scene object: {0}")]
    DuplicateObject(String),
}

/// Presentation side of the simulation.
///
/// Implementations must not feed anything back into simulation state.
pub trait SceneHost: TargetResolver {
    /// Render the environment for the current tick.
    fn apply_environment(&mut self, update: &EnvironmentUpdate);

    /// Materialize one schedule transition.
    fn apply_transition(&mut self, transition: &ScheduleTransition);

    /// Notification that the day counter advanced.
    fn on_day_advanced(&mut self, day: u64, week: u64) {
        debug!(day, week, "Day advanced");
    }
}

/// A renderer or collider with its enabled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneComponent {
    /// Component handle.
    pub id: ComponentId,
    /// Whether the component is enabled.
    pub enabled: bool,
}

impl SceneComponent {
    /// Mint an enabled component.
    fn enabled() -> Self {
        Self {
            id: ComponentId::new(),
            enabled: true,
        }
    }
}

/// One object in the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneObject {
    /// Scene name.
    pub name: String,
    /// Whether the object as a whole is present.
    pub active: bool,
    /// Visual components.
    pub renderers: Vec<SceneComponent>,
    /// Physical components.
    pub colliders: Vec<SceneComponent>,
}

impl SceneObject {
    /// Whether the object can be seen: present with a renderer enabled.
    pub fn is_visible(&self) -> bool {
        self.active && self.renderers.iter().any(|r| r.enabled)
    }

    /// Whether the object can be collided with: present with a collider
    /// enabled.
    pub fn is_solid(&self) -> bool {
        self.active && self.colliders.iter().any(|c| c.enabled)
    }
}

/// In-memory scene used by the headless engine.
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    /// Objects by target id.
    objects: BTreeMap<TargetId, SceneObject>,

    /// Skybox currently shown.
    skybox: Option<SkyboxAssignment>,

    /// Current directional light orientation.
    light: Option<LightRotation>,

    /// Current HUD labels: time text and day text.
    hud: Option<(String, String)>,

    /// Last day/week reported by the counter.
    last_rollover: Option<(u64, u64)>,
}

impl SceneRegistry {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::DuplicateObject`] if two objects share a name.
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        for object in &config.objects {
            let _ = scene.insert(
                &object.name,
                object.renderers,
                object.colliders,
                object.initially_active,
            )?;
        }
        info!(objects = scene.len(), "Scene loaded");
        Ok(scene)
    }

    /// Add an object with fresh, enabled components.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::DuplicateObject`] if the name is taken.
    pub fn insert(
        &mut self,
        name: &str,
        renderers: u32,
        colliders: u32,
        active: bool,
    ) -> Result<TargetId, SceneError> {
        let id = TargetId::from_name(name);
        if self.objects.contains_key(&id) {
            return Err(SceneError::DuplicateObject(name.to_owned()));
        }
        let object = SceneObject {
            name: name.to_owned(),
            active,
            renderers: (0..renderers).map(|_| SceneComponent::enabled()).collect(),
            colliders: (0..colliders).map(|_| SceneComponent::enabled()).collect(),
        };
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Remove an object, as if it were destroyed at runtime.
    pub fn remove(&mut self, id: TargetId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    /// Look up an object by id.
    pub fn get(&self, id: TargetId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Look up an object by name.
    pub fn get_by_name(&self, name: &str) -> Option<&SceneObject> {
        self.get(TargetId::from_name(name))
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects.
    pub fn objects(&self) -> impl Iterator<Item = (&TargetId, &SceneObject)> {
        self.objects.iter()
    }

    /// Skybox currently shown.
    pub const fn skybox(&self) -> Option<&SkyboxAssignment> {
        self.skybox.as_ref()
    }

    /// Current light orientation.
    pub const fn light(&self) -> Option<&LightRotation> {
        self.light.as_ref()
    }

    /// Current HUD labels as `(time, day)`.
    pub fn hud(&self) -> Option<(&str, &str)> {
        self.hud
            .as_ref()
            .map(|(time, day)| (time.as_str(), day.as_str()))
    }

    /// Last day/week reported by the counter.
    pub const fn last_rollover(&self) -> Option<(u64, u64)> {
        self.last_rollover
    }
}

impl TargetResolver for SceneRegistry {
    fn contains(&self, target: TargetId) -> bool {
        self.objects.contains_key(&target)
    }

    fn discover_components(&self, target: TargetId) -> Option<TargetComponents> {
        self.objects.get(&target).map(|object| TargetComponents {
            renderers: object.renderers.iter().map(|r| r.id).collect(),
            colliders: object.colliders.iter().map(|c| c.id).collect(),
        })
    }
}

impl SceneHost for SceneRegistry {
    fn apply_environment(&mut self, update: &EnvironmentUpdate) {
        if let Some(skybox) = &update.skybox {
            if self.skybox.as_ref().map(|s| s.material.as_str()) != Some(skybox.material.as_str()) {
                debug!(material = skybox.material.as_str(), "Skybox changed");
            }
            self.skybox = Some(skybox.clone());
        }
        self.light = Some(update.light);
        self.hud = Some((update.time_label.clone(), update.day_label.clone()));
    }

    fn apply_transition(&mut self, transition: &ScheduleTransition) {
        let Some(object) = self.objects.get_mut(&transition.target) else {
            warn!(
                target_name = transition.label.as_str(),
                "Transition for an object that no longer exists"
            );
            return;
        };
        let enable = transition.kind.resulting_active();
        match transition.materialization {
            Materialization::RenderersOnly => {
                // Colliders stay live in both directions.
                object.active = true;
                for renderer in &mut object.renderers {
                    if transition.renderers.contains(&renderer.id) {
                        renderer.enabled = enable;
                    }
                }
            }
            Materialization::WholeObject => object.active = enable,
        }
        debug!(
            target_name = object.name.as_str(),
            activated = matches!(transition.kind, TransitionKind::Activate),
            visible = object.is_visible(),
            solid = object.is_solid(),
            "Transition applied"
        );
    }

    fn on_day_advanced(&mut self, day: u64, week: u64) {
        self.last_rollover = Some((day, week));
    }
}

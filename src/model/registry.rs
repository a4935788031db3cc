use super::interaction::Interaction;
use super::particle::Particle;
use super::rigidbody::RigidBody;
use crate::error::Error;
use std::fmt;

/// Kinds of entity a registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Particle,
    RigidBody,
    Interaction,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Particle => write!(f, "particle"),
            EntityKind::RigidBody => write!(f, "rigid body"),
            EntityKind::Interaction => write!(f, "interaction"),
        }
    }
}

/// An entity that can be stored in a [`Registry`].
pub trait Entity: Sized {
    const KIND: EntityKind;

    fn key(&self) -> String;

    /// Whether `other` would occupy the same registry slot.
    fn same_key(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Unwraps `entity` if it is of this kind, handing it back otherwise.
    fn from_any(entity: AnyEntity) -> Result<Self, AnyEntity>;
}

impl Entity for Particle {
    const KIND: EntityKind = EntityKind::Particle;

    fn key(&self) -> String {
        self.label.clone()
    }

    fn from_any(entity: AnyEntity) -> Result<Self, AnyEntity> {
        match entity {
            AnyEntity::Particle(p) => Ok(p),
            other => Err(other),
        }
    }
}

impl Entity for RigidBody {
    const KIND: EntityKind = EntityKind::RigidBody;

    fn key(&self) -> String {
        self.label.clone()
    }

    fn from_any(entity: AnyEntity) -> Result<Self, AnyEntity> {
        match entity {
            AnyEntity::RigidBody(rb) => Ok(rb),
            other => Err(other),
        }
    }
}

impl Entity for Interaction {
    const KIND: EntityKind = EntityKind::Interaction;

    fn key(&self) -> String {
        self.label()
    }

    // Labels may themselves contain '-', so the joined key is not unique.
    fn same_key(&self, other: &Self) -> bool {
        self.p1_label == other.p1_label && self.p2_label == other.p2_label
    }

    fn from_any(entity: AnyEntity) -> Result<Self, AnyEntity> {
        match entity {
            AnyEntity::Interaction(i) => Ok(i),
            other => Err(other),
        }
    }
}

/// An entity of any kind, as handed over from untyped sources.
#[derive(Debug, Clone)]
pub enum AnyEntity {
    Particle(Particle),
    RigidBody(RigidBody),
    Interaction(Interaction),
}

impl AnyEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            AnyEntity::Particle(_) => EntityKind::Particle,
            AnyEntity::RigidBody(_) => EntityKind::RigidBody,
            AnyEntity::Interaction(_) => EntityKind::Interaction,
        }
    }
}

/// Insertion-ordered, label-keyed collection of one kind of entity.
///
/// Labels are unique: a second `add` with a label already present is
/// rejected rather than shadowed.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T) -> Result<(), Error> {
        if self.items.iter().any(|existing| existing.same_key(&item)) {
            return Err(Error::DuplicateLabel {
                kind: T::KIND,
                label: item.key(),
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Adds an untyped entity, rejecting it if it is not of this registry's kind.
    pub fn add_any(&mut self, entity: AnyEntity) -> Result<(), Error> {
        match T::from_any(entity) {
            Ok(item) => self.add(item),
            Err(other) => Err(Error::TypeMismatch {
                expected: T::KIND,
                found: other.kind(),
            }),
        }
    }

    pub fn get(&self, label: &str) -> Result<&T, Error> {
        self.items
            .iter()
            .find(|item| item.key() == label)
            .ok_or_else(|| Error::not_found(T::KIND, label))
    }

    pub fn get_mut(&mut self, label: &str) -> Result<&mut T, Error> {
        self.items
            .iter_mut()
            .find(|item| item.key() == label)
            .ok_or_else(|| Error::not_found(T::KIND, label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.items.iter().any(|item| item.key() == label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(Entity::key).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The entity graph of one resolved document.
///
/// Built once by the resolver and read-only for everything downstream.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    pub particles: Registry<Particle>,
    pub rigid_bodies: Registry<RigidBody>,
    pub interactions: Registry<Interaction>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_item_equal_by_label() {
        let mut reg = Registry::new();
        reg.add(Particle::new("A", 1.0, 1.0, 1.0)).unwrap();

        let mut copy = reg.get("A").unwrap().copy_type();
        copy.position = [9.0, 9.0, 9.0];
        copy.charge = -3.0;

        assert_eq!(reg.get("A").unwrap(), &copy);
        assert_eq!(reg.get("A").unwrap().charge, 1.0);
    }

    #[test]
    fn get_missing_label_is_not_found() {
        let reg: Registry<RigidBody> = Registry::new();
        assert!(matches!(
            reg.get("X"),
            Err(Error::NotFound { kind: EntityKind::RigidBody, ref label }) if label == "X"
        ));
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let mut reg = Registry::new();
        reg.add(Particle::new("A", 0.0, 1.0, 1.0)).unwrap();
        let err = reg.add(Particle::new("A", 5.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { kind: EntityKind::Particle, .. }));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("A").unwrap().charge, 0.0);
    }

    #[test]
    fn add_any_rejects_wrong_kind() {
        let mut reg: Registry<Particle> = Registry::new();
        let err = reg
            .add_any(AnyEntity::Interaction(Interaction::new("A", "B", 1.0, 1.0, 1.0)))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: EntityKind::Particle,
                found: EntityKind::Interaction
            }
        ));
        assert!(reg.is_empty());

        reg.add_any(AnyEntity::Particle(Particle::new("A", 0.0, 1.0, 1.0)))
            .unwrap();
        assert!(reg.contains("A"));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut reg = Registry::new();
        for label in ["C", "A", "B"] {
            reg.add(Particle::new(label, 0.0, 1.0, 1.0)).unwrap();
        }
        assert_eq!(reg.labels(), vec!["C", "A", "B"]);
    }

    #[test]
    fn interactions_are_keyed_by_pair() {
        let mut reg = Registry::new();
        reg.add(Interaction::new("A", "B", 1.0, 1.0, 1.0)).unwrap();
        reg.add(Interaction::new("A", "C", 1.0, 1.0, 1.0)).unwrap();
        assert!(reg.add(Interaction::new("A", "B", 2.0, 1.0, 1.0)).is_err());
        assert_eq!(reg.get("A-C").unwrap().p2_label, "C");
    }

    #[test]
    fn hyphenated_labels_do_not_alias_pairs() {
        let mut reg = Registry::new();
        reg.add(Interaction::new("A-B", "C", 1.0, 1.0, 1.0)).unwrap();
        reg.add(Interaction::new("A", "B-C", 2.0, 1.0, 1.0)).unwrap();
        assert_eq!(reg.len(), 2);

        let err = reg
            .add(Interaction::new("A", "B-C", 3.0, 1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { kind: EntityKind::Interaction, .. }));
    }
}

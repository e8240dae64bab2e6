//! Model specialization point

use crate::schema::ModelDescriptor;

/// A record type persisted in one table
///
/// Implementors are usually empty marker types; all column state lives in the
/// entity that wraps them.
///
/// ```
/// use rowmodel_core::Model;
///
/// struct Bike;
///
/// impl Model for Bike {
///     const TABLE: &'static str = "bikes";
/// }
///
/// assert_eq!(Bike::descriptor().table(), "bikes");
/// ```
pub trait Model: 'static {
    const TABLE: &'static str;

    /// Run-time token used to key the schema cache
    fn descriptor() -> ModelDescriptor
    where
        Self: Sized,
    {
        ModelDescriptor::new::<Self>(Self::TABLE)
    }
}

impl ModelDescriptor {
    /// Descriptor of a [`Model`] type
    pub fn of<M: Model>() -> Self {
        M::descriptor()
    }
}

use std::any::Any;

use crate::descriptor::{FieldImport, Implementation, ImportKind};
use crate::registry::Registry;
use crate::{Error, Key, Result, Shape};

impl Registry {
    /// Fills every empty import field of `instance`.
    ///
    /// Fields that already hold a value are left alone, which lets diamond
    /// shaped graphs share instances without re-wiring.
    pub(crate) fn wire_erased(
        &self,
        implementation: &Implementation,
        instance: &(dyn Any + Send + Sync),
    ) -> Result<()> {
        self.ensure_live()?;
        if instance.type_id() != implementation.key.id() {
            return Err(Error::invalid_argument(format!(
                "instance is not a '{}'",
                implementation.key
            )));
        }
        let owner = implementation.key.name();
        for field in implementation.unset_imports(instance) {
            tracing::trace!(
                implementation = owner,
                field = %field.name,
                kind = ?field.kind,
                "Wiring field",
            );
            let values = match field.kind {
                ImportKind::Many => {
                    if field.shape == Shape::Single {
                        return Err(Error::unwireable(
                            owner,
                            &field.name,
                            "field is not a sequence",
                        ));
                    }
                    self.resolve_many(&field.capability.unwrap_or(field.element))?
                }
                ImportKind::Single => {
                    let capability = single_capability(owner, field)?;
                    vec![self.resolve_one(&capability)?]
                }
            };
            if field.assign(instance, values).is_none() {
                return Err(Error::unwireable(
                    owner,
                    &field.name,
                    "resolved value does not match field type",
                ));
            }
        }
        Ok(())
    }
}

fn single_capability(owner: &'static str, field: &FieldImport) -> Result<Key> {
    match (field.shape, field.capability) {
        (Shape::Fixed, _) => Err(Error::unwireable(
            owner,
            &field.name,
            "marked singular but field is array-shaped",
        )),
        (Shape::Single, Some(capability)) => Ok(capability),
        (Shape::Single, None) => Ok(field.element),
        (_, Some(_)) => Err(Error::unwireable(
            owner,
            &field.name,
            "marked singular but field is sequence-shaped",
        )),
        (_, None) => Err(Error::InvalidCapability {
            name: field.field_type,
        }),
    }
}

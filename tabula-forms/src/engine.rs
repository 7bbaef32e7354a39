//! Form binding engine.
//!
//! Owns one model instance and one [`FieldBinding`] per described field.
//! User edits come in through [`FormBindingEngine::set_field`], which writes
//! through to the model and re-evaluates visibility of the dependent fields.

use crate::binding::{ChangeListener, FieldBinding, VisibilityOutcome};
use crate::config::FormConfig;
use crate::error::{FormError, FormResult};
use crate::surface::{FieldSurface, NullSurface};
use crate::validator::FieldValidator;
use std::sync::Arc;
use tabula_core::{
    Entity, FieldDescriptor, FieldMetadataIndex, Identity, Model, ModelDescriptor,
    ReflectionAccessError, StoreError, ValidationError, Value,
};
use tabula_storage::EntityStore;

type SaveHook<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;

pub struct FormBindingEngine<M: Model> {
    model: M,
    descriptor: Arc<ModelDescriptor>,
    bindings: Vec<FieldBinding>,
    config: FormConfig,
    before_save: Option<SaveHook<M>>,
    initialized: bool,
}

impl<M: Model + std::fmt::Debug> std::fmt::Debug for FormBindingEngine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBindingEngine")
            .field("model", &self.model)
            .field("bindings", &self.bindings)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl<M: Model> FormBindingEngine<M> {
    /// Headless form with auto-initialized fields.
    pub fn new(model: M) -> FormResult<Self> {
        Self::with_surfaces(model, true, |_| Box::new(NullSurface))
    }

    /// Build bindings for every described field, asking `surfaces` for each
    /// field's widget.
    ///
    /// Fails when the model does not expose a field its schema declares.
    pub fn with_surfaces<F>(model: M, auto_initialize: bool, mut surfaces: F) -> FormResult<Self>
    where
        F: FnMut(&FieldDescriptor) -> Box<dyn FieldSurface>,
    {
        let descriptor = FieldMetadataIndex::global().describe::<M>();
        let mut bindings = Vec::with_capacity(descriptor.fields.len());
        for field in &descriptor.fields {
            if model.get(&field.name).is_none() {
                return Err(ReflectionAccessError::NotReadable {
                    entity_type: descriptor.entity_type.clone(),
                    field: field.name.clone(),
                }
                .into());
            }
            let surface = surfaces(field);
            bindings.push(FieldBinding::new(field.clone(), surface, auto_initialize));
        }
        tracing::debug!(
            entity_type = %descriptor.entity_type,
            fields = bindings.len(),
            "Form bindings created"
        );
        Ok(Self {
            model,
            descriptor,
            bindings,
            config: FormConfig::default(),
            before_save: None,
            initialized: false,
        })
    }

    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Initialize every binding, then evaluate every visibility condition.
    pub fn initialize(&mut self) -> FormResult<()> {
        for binding in &mut self.bindings {
            binding.initialize(&mut self.model)?;
        }
        for binding in &mut self.bindings {
            binding.apply_visibility(&self.model, None);
        }
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Apply a user edit and re-evaluate visibility of fields depending on
    /// `field`. Identity and read-only fields reject edits.
    pub fn set_field(&mut self, field: &str, value: Value) -> FormResult<Vec<(String, VisibilityOutcome)>> {
        let index = self.index_of(field)?;
        if !self.bindings[index].descriptor().editable {
            tracing::warn!(field = %field, "Edit rejected, field is read-only");
            return Err(FormError::ReadOnlyField {
                field: field.to_string(),
            });
        }
        self.bindings[index].set_data(&mut self.model, value)?;
        Ok(self.reevaluate(Some(field)))
    }

    fn reevaluate(&mut self, changed: Option<&str>) -> Vec<(String, VisibilityOutcome)> {
        self.bindings
            .iter_mut()
            .map(|b| {
                let outcome = b.apply_visibility(&self.model, changed);
                (b.name().to_string(), outcome)
            })
            .filter(|(_, outcome)| *outcome != VisibilityOutcome::Skipped)
            .collect()
    }

    fn index_of(&self, field: &str) -> FormResult<usize> {
        self.bindings
            .iter()
            .position(|b| b.name() == field)
            .ok_or_else(|| FormError::UnknownField {
                field: field.to_string(),
            })
    }

    pub fn field(&self, name: &str) -> Option<&FieldBinding> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut FormConfig {
        &mut self.config
    }

    pub fn set_validator(&mut self, field: &str, validator: Box<dyn FieldValidator>) -> FormResult<()> {
        let index = self.index_of(field)?;
        self.bindings[index].set_validator(validator);
        Ok(())
    }

    pub fn add_listener(&mut self, field: &str, listener: ChangeListener) -> FormResult<()> {
        let index = self.index_of(field)?;
        self.bindings[index].add_listener(listener);
        Ok(())
    }

    /// Hook run before saving. Returning `false` vetoes the save.
    pub fn set_before_save<F>(&mut self, hook: F)
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        self.before_save = Some(Box::new(hook));
    }

    /// Validate every visible binding. Hidden fields never block.
    pub fn validate_all(&mut self) -> bool {
        let mut valid = true;
        for binding in self.bindings.iter_mut().filter(|b| b.is_visible()) {
            valid &= binding.validate();
        }
        valid
    }

    /// Current inline errors as (field, message).
    pub fn errors(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .filter_map(|b| b.error().map(|e| (b.name().to_string(), e.to_string())))
            .collect()
    }

    /// Refresh every binding from the model.
    pub fn pull_all(&mut self) -> FormResult<()> {
        for binding in &mut self.bindings {
            binding.pull(&self.model)?;
        }
        Ok(())
    }

    /// Write every binding's data into the model.
    pub fn push_all(&mut self) -> FormResult<()> {
        for binding in &self.bindings {
            binding.push(&mut self.model)?;
        }
        Ok(())
    }

    pub fn clear_all(&mut self) -> FormResult<()> {
        for binding in &mut self.bindings {
            binding.clear(&mut self.model)?;
        }
        self.reevaluate(None);
        Ok(())
    }

    fn first_validation_error(&self) -> ValidationError {
        self.bindings
            .iter()
            .filter(|b| b.is_visible())
            .find_map(|b| {
                b.error().map(|message| {
                    if message == crate::validator::REQUIRED_MESSAGE {
                        ValidationError::RequiredFieldMissing {
                            field: b.name().to_string(),
                        }
                    } else {
                        ValidationError::InvalidValue {
                            field: b.name().to_string(),
                            reason: message.to_string(),
                        }
                    }
                })
            })
            .unwrap_or(ValidationError::Vetoed)
    }
}

impl<M: Entity> FormBindingEngine<M> {
    /// Veto hook, validation gate, push, then save through `store`.
    ///
    /// The saved entity replaces the form's model so a newly assigned
    /// identity shows up in the identity field.
    pub async fn save<S>(&mut self, store: &S) -> FormResult<Identity>
    where
        S: EntityStore<M> + ?Sized,
    {
        if !self.initialized {
            self.initialize()?;
        }
        if let Some(hook) = &self.before_save {
            if !hook(&self.model) {
                tracing::info!(entity_type = %self.descriptor.entity_type, "Save vetoed by hook");
                return Err(ValidationError::Vetoed.into());
            }
        }
        if !self.validate_all() {
            return Err(self.first_validation_error().into());
        }
        self.push_all()?;

        let saved = store.save(self.model.clone()).await?;
        let identity = saved.identity().ok_or_else(|| StoreError::SaveFailed {
            entity_type: self.descriptor.entity_type.clone(),
            reason: "store returned an entity without identity".to_string(),
        })?;
        self.model = saved;
        self.pull_all()?;
        tracing::info!(
            entity_type = %self.descriptor.entity_type,
            identity = %identity,
            "Form saved"
        );
        Ok(identity)
    }
}

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use outcome_core::Command;
use tracing::{debug, info};

use crate::operation::Operation;

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors raised while building or querying an [`OperationRegistry`].
///
/// All of them indicate wiring mistakes, never business failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate binding for {contract}: {existing} already bound, {duplicate} rejected")]
    DuplicateBinding {
        contract: &'static str,
        existing: &'static str,
        duplicate: &'static str,
    },
    #[error("no operation bound for {contract}")]
    Unbound { contract: &'static str },
    #[error("missing dependency: {type_name}")]
    MissingDependency { type_name: &'static str },
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

/// Type-keyed container of shared collaborators handed to operation factories.
///
/// Each type is stored at most once; providing it again replaces the old value.
/// Filled through the builder and frozen by [`OperationRegistryBuilder::build`]:
/// a built registry only hands out shared references, so its collaborators
/// cannot be swapped.
///
/// ```compile_fail
/// # use outcome_service::OperationRegistry;
/// let registry = OperationRegistry::builder().provide(1_u32).build().unwrap();
/// registry.dependencies().provide(2_u32);
/// ```
pub struct Dependencies {
    by_type: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Dependencies {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    /// Store `value` under its concrete type.
    pub fn provide<T: Send + Sync + 'static>(&mut self, value: T) {
        self.provide_arc(Arc::new(value));
    }

    /// Store an already shared value under its concrete type.
    pub fn provide_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.by_type.insert(TypeId::of::<T>(), value);
    }

    /// Retrieve a value by its concrete type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Like [`get`](Self::get), but a missing value is an error.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingDependency`] if `T` was never provided.
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        self.get::<T>().ok_or(RegistryError::MissingDependency {
            type_name: std::any::type_name::<T>(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl Default for Dependencies {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// Builds a fresh operation instance for one contract.
type Factory<C, R> =
    Arc<dyn Fn(&Dependencies) -> Result<Box<dyn Operation<C, R>>, RegistryError> + Send + Sync>;

/// Dry-run of a factory, used by `build()` to check dependencies up front.
type Probe = Box<dyn Fn(&Dependencies) -> Result<(), RegistryError> + Send + Sync>;

/// Identity of a contract: the `(command, result)` type pair.
type BindingKey = (TypeId, TypeId);

/// Public description of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryEntry {
    /// Type name of the abstract contract, e.g. `Operation<CreateUser, UserId>`.
    pub contract: &'static str,
    /// Type name of the concrete implementation.
    pub implementation: &'static str,
}

struct Binding {
    entry: RegistryEntry,
    /// Holds a `Factory<C, R>` for the binding's key.
    factory: Box<dyn Any + Send + Sync>,
    probe: Probe,
}

fn key_of<C: 'static, R: 'static>() -> BindingKey {
    (TypeId::of::<C>(), TypeId::of::<R>())
}

// ---------------------------------------------------------------------------
// OperationModule
// ---------------------------------------------------------------------------

/// A group of bindings contributed by one feature area.
///
/// Modules are the explicit replacement for scanning the process for
/// implementations: each feature lists its operations once, and the host
/// passes every module to [`OperationRegistryBuilder::module`].
pub trait OperationModule {
    /// Short name used in logs (e.g. `"accounts"`).
    fn name(&self) -> &'static str;

    /// Add this module's bindings to `builder`.
    fn register(&self, builder: OperationRegistryBuilder) -> OperationRegistryBuilder;
}

/// Register a list of `Default`-constructible operations in one expression.
///
/// ```
/// # use async_trait::async_trait;
/// # use outcome_core::{Command, Outcome};
/// # use outcome_service::{register_operations, Operation, OperationRegistry};
/// # use tokio_util::sync::CancellationToken;
/// # struct Ping;
/// # impl Command for Ping {}
/// #[derive(Default)]
/// struct PingOperation;
///
/// #[async_trait]
/// impl Operation<Ping, ()> for PingOperation {
///     async fn execute(&self, _: Ping, _: CancellationToken) -> Outcome<()> {
///         Outcome::completed()
///     }
/// }
///
/// let registry = register_operations!(OperationRegistry::builder(), {
///     Ping => (): PingOperation,
/// })
/// .build()
/// .unwrap();
/// assert_eq!(registry.len(), 1);
/// ```
#[macro_export]
macro_rules! register_operations {
    ($builder:expr, { $($command:ty => $result:ty : $operation:ty),* $(,)? }) => {{
        let builder = $builder;
        $(
            let builder = builder.register_default::<$command, $result, $operation>();
        )*
        builder
    }};
}

// ---------------------------------------------------------------------------
// OperationRegistryBuilder
// ---------------------------------------------------------------------------

/// Collects bindings and dependencies before the registry is frozen.
///
/// Bindings are kept in registration order so duplicate detection reports
/// the first registration as the existing one.
pub struct OperationRegistryBuilder {
    pending: Vec<(BindingKey, Binding)>,
    dependencies: Dependencies,
}

impl OperationRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            dependencies: Dependencies::new(),
        }
    }

    /// Make `value` available to factories through [`Dependencies::get`].
    #[must_use]
    pub fn provide<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.dependencies.provide(value);
        self
    }

    /// Shared-ownership variant of [`provide`](Self::provide).
    #[must_use]
    pub fn provide_arc<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.dependencies.provide_arc(value);
        self
    }

    #[must_use]
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Bind `O` as the implementation of `Operation<C, R>`.
    ///
    /// `factory` runs on every resolve, so each caller receives its own
    /// instance.
    #[must_use]
    pub fn register<C, R, O, F>(mut self, factory: F) -> Self
    where
        C: Command,
        R: Send + 'static,
        O: Operation<C, R>,
        F: Fn(&Dependencies) -> Result<O, RegistryError> + Send + Sync + 'static,
    {
        let factory: Factory<C, R> = Arc::new(move |deps: &Dependencies| {
            factory(deps).map(|op| Box::new(op) as Box<dyn Operation<C, R>>)
        });
        let probe: Probe = {
            let factory = Arc::clone(&factory);
            Box::new(move |deps: &Dependencies| factory(deps).map(drop))
        };
        let binding = Binding {
            entry: RegistryEntry {
                contract: std::any::type_name::<dyn Operation<C, R>>(),
                implementation: std::any::type_name::<O>(),
            },
            factory: Box::new(factory),
            probe,
        };
        self.pending.push((key_of::<C, R>(), binding));
        self
    }

    /// Bind `O` using its `Default` impl as the factory.
    #[must_use]
    pub fn register_default<C, R, O>(self) -> Self
    where
        C: Command,
        R: Send + 'static,
        O: Operation<C, R> + Default,
    {
        self.register::<C, R, O, _>(|_| Ok(O::default()))
    }

    /// Add every binding contributed by `module`.
    #[must_use]
    pub fn module(self, module: &dyn OperationModule) -> Self {
        debug!(module = module.name(), "registering operation module");
        module.register(self)
    }

    /// Freeze the bindings into a read-only registry.
    ///
    /// Every factory is run once against the collected dependencies so that
    /// wiring mistakes surface at startup rather than on first use.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateBinding`] if two implementations claim the
    ///   same `(command, result)` pair
    /// - [`RegistryError::MissingDependency`] (or any other factory error) if
    ///   a factory cannot build its operation
    pub fn build(self) -> Result<OperationRegistry, RegistryError> {
        let mut bindings: HashMap<BindingKey, Binding> = HashMap::with_capacity(self.pending.len());

        for (key, binding) in self.pending {
            if let Some(existing) = bindings.get(&key) {
                return Err(RegistryError::DuplicateBinding {
                    contract: binding.entry.contract,
                    existing: existing.entry.implementation,
                    duplicate: binding.entry.implementation,
                });
            }
            (binding.probe)(&self.dependencies)?;
            debug!(
                contract = binding.entry.contract,
                implementation = binding.entry.implementation,
                "operation bound"
            );
            bindings.insert(key, binding);
        }

        info!(
            bindings = bindings.len(),
            dependencies = self.dependencies.len(),
            "operation registry built"
        );

        Ok(OperationRegistry {
            bindings,
            dependencies: self.dependencies,
        })
    }
}

impl Default for OperationRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// OperationRegistry
// ---------------------------------------------------------------------------

/// Read-only table mapping each `Operation<C, R>` contract to its implementation.
///
/// Built once at startup via [`OperationRegistry::builder`]. Lookups take no
/// locks, so the registry can be shared behind an `Arc` by any number of
/// concurrent callers. Resolution is transient: every call produces a new
/// operation instance.
pub struct OperationRegistry {
    bindings: HashMap<BindingKey, Binding>,
    dependencies: Dependencies,
}

impl OperationRegistry {
    #[must_use]
    pub fn builder() -> OperationRegistryBuilder {
        OperationRegistryBuilder::new()
    }

    /// Build a fresh instance of the operation bound to `Operation<C, R>`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unbound`] if nothing is bound for the pair,
    /// or the factory's own error.
    pub fn resolve<C, R>(&self) -> Result<Box<dyn Operation<C, R>>, RegistryError>
    where
        C: Command,
        R: Send + 'static,
    {
        let unbound = || RegistryError::Unbound {
            contract: std::any::type_name::<dyn Operation<C, R>>(),
        };
        let binding = self.bindings.get(&key_of::<C, R>()).ok_or_else(unbound)?;
        let factory = binding
            .factory
            .downcast_ref::<Factory<C, R>>()
            .ok_or_else(unbound)?;
        factory(&self.dependencies)
    }

    /// [`resolve`](Self::resolve) without the error detail.
    pub fn try_resolve<C, R>(&self) -> Option<Box<dyn Operation<C, R>>>
    where
        C: Command,
        R: Send + 'static,
    {
        self.resolve::<C, R>().ok()
    }

    #[must_use]
    pub fn contains<C, R>(&self) -> bool
    where
        C: Command,
        R: Send + 'static,
    {
        self.bindings.contains_key(&key_of::<C, R>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings, sorted by contract name.
    #[must_use]
    pub fn entries(&self) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> =
            self.bindings.values().map(|binding| binding.entry).collect();
        entries.sort();
        entries
    }

    #[must_use]
    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("bindings", &self.entries())
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

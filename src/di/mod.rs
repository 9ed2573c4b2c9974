mod builder;
mod container;
mod injectable;
mod scoped;

pub use builder::ContainerBuilder;
pub use container::{Container, Instance, InstanceFactory, MetaData, Scope};
pub use injectable::Injectable;
pub use scoped::ScopedInstances;

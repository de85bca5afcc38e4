//! Field names the engine itself relies on.

pub const ID: &str = "id";
pub const OBJECT_ID: &str = "objectId";
pub const URN: &str = "urn";
pub const NAME: &str = "name";
pub const PARENT_ID: &str = "parentId";
pub const GROUP_ID: &str = "groupId";
pub const ORGANIZATION_ID: &str = "organizationId";

/// Back-reference to the owner of a referenced child.
pub const REFERENCE_ID: &str = "referenceId";

/// Model name of the owner of a referenced child.
pub const REFERENCE_TYPE: &str = "referenceType";

/// Base model placeholder that resolves to the declaring model.
pub const SELF_MODEL: &str = "$self";

pub mod authz {
    pub mod permission;
}

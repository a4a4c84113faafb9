//! Workspace-level integration tests for combo4

#[cfg(test)]
mod generate_integration;

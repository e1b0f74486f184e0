use super::Workspace;
use crate::{CollisionPolicy, Engine, WorkspaceConfig};

#[derive(Debug, Default)]
pub struct Builder {
    config: WorkspaceConfig,
}

impl Builder {
    /// Set the prefix prepended to every derived dataset name
    pub fn name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.config.name_prefix = prefix.to_string();
        self
    }

    pub fn collision_policy(&mut self, policy: CollisionPolicy) -> &mut Self {
        self.config.collision_policy = policy;
        self
    }

    /// Set the engine workspace datasets are loaded into
    pub fn path(&mut self, path: &str) -> &mut Self {
        self.config.path = path.to_string();
        self
    }

    /// Replace every setting with `config`
    pub fn config(&mut self, config: WorkspaceConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn build(&self, engine: impl Engine + 'static) -> Workspace {
        Workspace::from_parts(Box::new(engine), self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memspace_engine_mem::MemEngine;

    #[test]
    fn settings_apply_in_order() {
        let workspace = Workspace::builder()
            .config(WorkspaceConfig {
                path: "scratch".to_string(),
                ..Default::default()
            })
            .name_prefix("tmp_")
            .collision_policy(CollisionPolicy::Suffix)
            .build(MemEngine::new());

        let config = workspace.config();
        assert_eq!(config.path, "scratch");
        assert_eq!(config.name_prefix, "tmp_");
        assert_eq!(config.collision_policy, CollisionPolicy::Suffix);
    }
}

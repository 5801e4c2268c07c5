use std::collections::HashMap;
use log::{debug, error};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderDefValue
};


pub fn make_module(
    composer: &mut Composer,
    shader_path: &str,
    shader_source: &str,
    shader_defs: Option<HashMap<String, ShaderDefValue>>,
) -> anyhow::Result<naga::Module> {
    composer
        .make_naga_module(NagaModuleDescriptor {
            source: shader_source,
            file_path: shader_path,
            shader_defs: shader_defs.unwrap_or_default(),
            ..Default::default()
        })
        .map_err(|e| anyhow::anyhow!("composing {shader_path}: {e:?}"))
}

pub fn init_composer() -> Composer {
    let mut composer = Composer::default();

    let mut load_composable = |source: &str, file_path: &str| {
        match composer.add_composable_module(ComposableModuleDescriptor {
            source,
            file_path,
            ..Default::default()
        }) {
            Ok(_module) => {
                debug!("loaded shader module {file_path}")
            }
            Err(e) => {
                error!("{file_path} -> {e:#?}")
            }
        }
    };

    // Init modules for shared utils
    load_composable(
        include_str!("shaders/utils.wgsl"),
        "shaders/utils.wgsl",
    );
    composer
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::ShaderLib;

    #[test]
    fn cube_shader_composes() {
        let lib = ShaderLib::builtin();
        let cube = lib.template(ShaderLib::CUBE).unwrap();
        let mut composer = init_composer();
        let module = make_module(&mut composer, cube.shader_path, &cube.shader_source, None).unwrap();
        let entry_points: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }
}

use paramkit_build::{GeneratorConfig, build};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GeneratorConfig::default().header("Generated from params.toml by paramkit-build.\nDo not edit.");
    let output = build!(config = config; "params.toml")?;

    if !output.is_ok() {
        return Err(format!("{} descriptor unit(s) failed to generate", output.failures.len()).into());
    }

    Ok(())
}

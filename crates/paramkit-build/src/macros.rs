/// Generate `OUT_DIR/paramkit.rs` from descriptor files in a build script.
///
/// Evaluates to `Result<BatchOutput, Error>`. Failed units are reported as
/// cargo warnings; the units that generated are still written.
///
/// ```ignore
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     paramkit_build::build!("params.toml")?;
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! build {
    (config = $config:expr; $($file:expr),+ $(,)?) => {{
        //
        // CARGO
        //

        println!("cargo:rerun-if-changed=build.rs");
        $( println!("cargo:rerun-if-changed={}", $file); )+

        match ::std::env::var("OUT_DIR") {
            Ok(out_dir) => {
                let files = [$( ::std::path::PathBuf::from($file) ),+];
                let result = $crate::Generator::new($config)
                    .build_files(&files, ::std::path::Path::new(&out_dir));

                if let Ok(output) = &result {
                    for failure in &output.failures {
                        println!("cargo:warning=paramkit: {failure}");
                    }
                }

                result
            }
            Err(_) => Err($crate::Error::Write {
                path: ::std::path::PathBuf::from("OUT_DIR"),
                source: ::std::io::Error::new(::std::io::ErrorKind::NotFound, "OUT_DIR not set"),
            }),
        }
    }};
    ($($file:expr),+ $(,)?) => {
        $crate::build!(config = $crate::GeneratorConfig::default(); $($file),+)
    };
}

//! Mapping from the host platform to release asset naming

/// Release asset naming for one host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
    pub extension: &'static str,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            os: "linux",
            arch: "amd64",
            extension: "tar.gz",
        }
    }
}

/// Platform mapping result together with the dimensions that fell back to defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlatform {
    pub platform: Platform,
    pub warnings: Vec<String>,
}

impl Platform {
    /// Maps an OS/arch pair to asset naming.
    ///
    /// Accepts both Node-style names reported by Actions runners
    /// (`win32`, `x64`, `ia32`) and Rust `std::env::consts` names
    /// (`windows`, `x86_64`, `x86`). Unknown values keep the default
    /// and add one warning per unknown dimension.
    pub fn resolve(os: &str, arch: &str) -> ResolvedPlatform {
        let mut platform = Platform::default();
        let mut warnings = Vec::new();

        match os {
            "linux" => {}
            "darwin" | "macos" => platform.os = "darwin",
            "win32" | "windows" => {
                platform.os = "windows";
                platform.extension = "zip";
            }
            _ => warnings.push(format!(
                "unknown platform: {}; defaulting to {}",
                os, platform.os
            )),
        }

        match arch {
            "x64" | "x86_64" => {}
            "arm64" | "aarch64" => platform.arch = "arm64",
            "ia32" | "x86" | "i686" => platform.arch = "386",
            _ => warnings.push(format!(
                "unknown architecture: {}; defaulting to {}",
                arch, platform.arch
            )),
        }

        ResolvedPlatform { platform, warnings }
    }

    /// Maps the platform this binary was built for
    pub fn host() -> ResolvedPlatform {
        Self::resolve(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Asset file name, e.g. `coolify-cli_1.4.0_linux_amd64.tar.gz`
    pub fn asset_name(&self, prefix: &str, version: &str) -> String {
        format!(
            "{}_{}_{}_{}.{}",
            prefix, version, self.os, self.arch, self.extension
        )
    }
}

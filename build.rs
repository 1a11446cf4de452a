use std::cmp::Ordering;
use std::env;
use std::process::Command;

// CPU features the kernel has a vector backend for
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    /// Every token that must appear in the platform feature listing.
    requires: &'static [&'static str],
    cfg_flag: &'static str,
    detected: bool,
}

impl CpuFeature {
    // Lowest number == highest priority
    fn priority(&self) -> usize {
        match self.name {
            "avx2" => 0,
            "neon" => 1,
            _ => usize::MAX,
        }
    }

    fn features() -> Vec<CpuFeature> {
        vec![
            CpuFeature {
                name: "avx2",
                requires: &["avx2", "fma"],
                cfg_flag: "avx2",
                detected: false,
            },
            CpuFeature {
                name: "neon",
                requires: &["neon"],
                cfg_flag: "neon",
                detected: false,
            },
        ]
    }
}

impl Ord for CpuFeature {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl PartialOrd for CpuFeature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self, target_arch: &str) -> bool;
}

// Every AArch64 core implements Advanced SIMD, no probing needed.
struct Aarch64Detector;
impl CpuFeatureDetector for Aarch64Detector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        for feature in features.iter_mut() {
            feature.detected = feature.name == "neon";
        }
    }

    fn is_applicable(&self, target_arch: &str) -> bool {
        target_arch == "aarch64"
    }
}

struct LinuxX86Detector;
impl CpuFeatureDetector for LinuxX86Detector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let flags: Vec<String> = cpuinfo
                .lines()
                .filter(|line| line.starts_with("flags"))
                .flat_map(|line| line.split_whitespace().map(str::to_lowercase))
                .collect();
            for feature in features.iter_mut() {
                feature.detected = feature
                    .requires
                    .iter()
                    .all(|token| flags.iter().any(|flag| flag == token));
            }
        }
    }

    fn is_applicable(&self, target_arch: &str) -> bool {
        cfg!(target_os = "linux") && target_arch == "x86_64"
    }
}

struct MacOSX86Detector;
impl CpuFeatureDetector for MacOSX86Detector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                if feature.name == "avx2" {
                    feature.detected = contents.contains("hw.optional.avx2_0: 1")
                        && contents.contains("hw.optional.fma: 1");
                }
            }
        }
    }

    fn is_applicable(&self, target_arch: &str) -> bool {
        cfg!(target_os = "macos") && target_arch == "x86_64"
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![
            Box::new(Aarch64Detector),
            Box::new(LinuxX86Detector),
            Box::new(MacOSX86Detector),
        ]
    }

    fn detect_cpu_features(features: &mut [CpuFeature], target_arch: &str, native: bool) {
        for detector in Self::cpu_features_detectors() {
            if !detector.is_applicable(target_arch) {
                continue;
            }
            // Probing the host only says something about the target on native x86 builds.
            if target_arch == "aarch64" || native {
                detector.detect_features(features);
            }
            break;
        }
    }

    fn apply(features: &mut [CpuFeature]) {
        features.sort();

        // No detected feature selects the scalar backend.
        let cfg_flag = features
            .iter()
            .find(|cpu_feature| cpu_feature.detected)
            .map(|cpu_feature| cpu_feature.cfg_flag)
            .unwrap_or("fallback");

        println!("cargo:rustc-cfg={cfg_flag}");

        println!("cargo::rustc-check-cfg=cfg(avx2)");
        println!("cargo::rustc-check-cfg=cfg(neon)");
        println!("cargo::rustc-check-cfg=cfg(fallback)");
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    let is_native_build = host == target;

    let mut features = CpuFeature::features();
    PlatformDetector::detect_cpu_features(&mut features, &target_arch, is_native_build);
    PlatformDetector::apply(&mut features);
}

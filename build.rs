use std::env;
use std::fs;
use std::path::Path;

// #define NAME "value" lines we lift out of device_config.h into
// compile-time env vars for config.rs defaults.
const HEADER_DEFINES: &[&str] = &[
    "WIFI_SSID",
    "WIFI_PASSWORD",
    "DEVICE_CPID",
    "DEVICE_ENV",
    "DEVICE_MQTT_HOST",
    "DEVICE_DUID",
    "DEVICE_MODEL",
];

fn main() -> anyhow::Result<()> {
    // Necessary for ESP-IDF
    embuild::espidf::sysenv::output();

    // Read device configuration if it exists
    let device_config_path = "device_config.h";
    if Path::new(device_config_path).exists() {
        let contents = fs::read_to_string(device_config_path)?;
        for name in HEADER_DEFINES {
            let needle = format!("#define {name}");
            let value = contents
                .lines()
                .find(|l| l.contains(&needle))
                .and_then(|l| l.split('"').nth(1))
                .unwrap_or("");
            println!("cargo:rustc-env={name}={value}");
        }
        println!("cargo:rerun-if-changed={device_config_path}");
    } else {
        for name in HEADER_DEFINES {
            println!("cargo:rustc-env={name}=");
        }
        println!("cargo:warning=device_config.h not found! Copy device_config.h.example to device_config.h and fill in your credentials.");
    }

    // Stage the device X.509 material for include_str!. Missing files
    // become empty placeholders; the telemetry task refuses to start on an
    // empty certificate at runtime.
    let out_dir = env::var("OUT_DIR")?;
    for pem in ["device_cert.pem", "device_key.pem"] {
        let staged = Path::new(&out_dir).join(pem);
        if Path::new(pem).exists() {
            fs::copy(pem, &staged)?;
        } else {
            fs::write(&staged, "")?;
        }
        println!("cargo:rerun-if-changed={pem}");
    }

    Ok(())
}

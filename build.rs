fn main() {
    println!("cargo:rerun-if-env-changed=GROWZONE_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=GROWZONE_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=GROWZONE_MQTT_URL");
    println!("cargo:rerun-if-env-changed=GROWZONE_MQTT_USERNAME");
    println!("cargo:rerun-if-env-changed=GROWZONE_MQTT_PASSWORD");

    // Host builds (tests, fuzzing) have no ESP-IDF environment to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

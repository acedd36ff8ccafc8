fn main() {
    // HOYODAILY_VERSION is set by the release workflow to the git tag version
    if let Ok(version) = std::env::var("HOYODAILY_VERSION") {
        println!("cargo:rustc-env=HOYODAILY_VERSION={}", version);
    }

    #[cfg(target_os = "windows")]
    {
        let mut res = winresource::WindowsResource::new();
        res.set_icon("assets/HoyoDaily.ico");
        res.set("ProductName", "HoyoDaily");
        res.set("FileDescription", "HoYoLAB daily check-in helper");

        let version = std::env::var("HOYODAILY_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let mut parts = version
            .split('.')
            .map(|s| s.parse::<u16>().unwrap_or(0))
            .chain(std::iter::repeat(0));
        let (major, minor, patch) = (
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
        );

        // VERSIONINFO packs major.minor.patch.build into four 16-bit fields
        let version_u64 = (major as u64) << 48 | (minor as u64) << 32 | (patch as u64) << 16;
        res.set_version_info(winresource::VersionInfo::PRODUCTVERSION, version_u64);
        res.set_version_info(winresource::VersionInfo::FILEVERSION, version_u64);
        res.set("ProductVersion", &version);
        res.set("FileVersion", &version);

        res.compile()
            .expect("Failed to compile Windows resources. Ensure assets/HoyoDaily.ico exists");
    }
}

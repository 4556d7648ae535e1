use std::cell::Cell;
use std::path::{Path, PathBuf};

use atbp_core::config::PluginSettings;
use atbp_core::platform::PlatformVariant;
use atbp_platform::installer::{InstallOutcome, InstallReport, PlatformInstaller, PresenceCheck};
use atbp_platform::macos::MacInstaller;
use uuid::Uuid;

#[test]
fn from_config_builds_matching_variant() {
    let resources = Path::new("/opt/OpenATBPClient");
    let mut settings = PluginSettings::default();
    settings.windows.plugin_library = Some("/plugins/webplayer_win.dll".to_string());

    let win = PlatformInstaller::from_config(PlatformVariant::Windows, &settings, resources).unwrap();
    assert_eq!(win.platform(), PlatformVariant::Windows);
    let PlatformInstaller::Windows(w) = &win else {
        panic!("expected windows installer");
    };
    assert_eq!(w.plugin_library(), Path::new("/plugins/webplayer_win.dll"));
    assert_eq!(w.installer().args, vec!["/quiet", "/S"]);

    let mac = PlatformInstaller::from_config(PlatformVariant::MacOS, &settings, resources).unwrap();
    let PlatformInstaller::MacOS(m) = &mac else {
        panic!("expected mac installer");
    };
    assert_eq!(m.plugin_root(), Path::new(atbp_core::paths::MAC_PLUGIN_ROOT));
    assert_eq!(m.bundle_source(), resources.join("StableUnityPlayer3.x.x-x86_64.bundle"));

    let other = PlatformInstaller::from_config(PlatformVariant::Other, &settings, resources).unwrap();
    assert!(matches!(other, PlatformInstaller::Unsupported));
}

#[tokio::test]
async fn unsupported_platform_completes_without_action() {
    let installer = PlatformInstaller::Unsupported;
    assert!(matches!(installer.check().await, PresenceCheck::Present));
    assert_eq!(installer.install().await.unwrap(), InstallReport::NoAction);

    let calls = Cell::new(0);
    installer
        .ensure_ready(|outcome| {
            assert!(matches!(outcome, InstallOutcome::AlreadyPresent));
            calls.set(calls.get() + 1);
        })
        .await;
    assert_eq!(calls.get(), 1);
}

#[tokio::test]
async fn mac_ensure_ready_reports_unsupported_once() {
    let root = std::env::temp_dir().join(format!("atbp-dispatch-{}", Uuid::new_v4()));
    let _cleanup = CleanupDir(root.clone());
    let installer = PlatformInstaller::MacOS(MacInstaller::new(
        root.join("Unity Web Player.plugin"),
        root.join("bundle"),
    ));

    let calls = Cell::new(0);
    installer
        .ensure_ready(|outcome| {
            assert!(matches!(outcome, InstallOutcome::Unsupported(_)), "{outcome:?}");
            calls.set(calls.get() + 1);
        })
        .await;
    assert_eq!(calls.get(), 1);
}

#[tokio::test]
async fn mac_ensure_ready_copies_bundle() {
    let root = std::env::temp_dir().join(format!("atbp-dispatch-{}", Uuid::new_v4()));
    let _cleanup = CleanupDir(root.clone());
    let plugin_root = root.join("Unity Web Player.plugin");
    let exe = atbp_core::paths::mac_plugin_executable(&plugin_root);
    std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
    // 小端存储的单架构 x86_64
    std::fs::write(&exe, [0xCF, 0xFA, 0xED, 0xFE, 0x07, 0x00, 0x00, 0x01]).unwrap();
    let source = root.join("bundle");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(source.join("payload"), "p").unwrap();

    let installer = PlatformInstaller::MacOS(MacInstaller::new(plugin_root.clone(), source));
    let calls = Cell::new(0);
    installer
        .ensure_ready(|outcome| {
            match outcome {
                InstallOutcome::Installed(InstallReport::BundleCopied { destination }) => {
                    assert_eq!(destination, atbp_core::paths::mac_player_bundle(&plugin_root));
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
            calls.set(calls.get() + 1);
        })
        .await;
    assert_eq!(calls.get(), 1);
    assert!(atbp_core::paths::mac_player_bundle(&plugin_root).join("payload").exists());
}

struct CleanupDir(PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

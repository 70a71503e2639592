use super::{create_test_service, register};
use crate::core::errors::NeosecError;
use crate::core::models::vpn::{NewVpnConfig, VpnConfigUpdate, VpnProtocol};
use std::sync::Arc;

fn openvpn(name: &str) -> NewVpnConfig {
    NewVpnConfig {
        name: name.to_string(),
        protocol: VpnProtocol::OpenVPN,
        description: Some("Primary tunnel".to_string()),
        config_file_name: "office.ovpn".to_string(),
        config_file_content: "client\ndev tun\nproto udp\nremote vpn.example.com 1194\n".to_string(),
    }
}

fn wireguard(name: &str) -> NewVpnConfig {
    NewVpnConfig {
        name: name.to_string(),
        protocol: VpnProtocol::WireGuard,
        description: None,
        config_file_name: "wg0.conf".to_string(),
        config_file_content: "[Interface]\nAddress = 10.0.0.2/32\n".to_string(),
    }
}

#[tokio::test]
async fn create_and_list_newest_first() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;

    let first = service.create_vpn_config(&user, openvpn("Office")).await.unwrap();
    let second = service.create_vpn_config(&user, wireguard("Home")).await.unwrap();
    assert!(!first.is_active);

    let configs = service.list_vpn_configs(&user).await.unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].id, second.id);
    assert_eq!(configs[1].id, first.id);
}

#[tokio::test]
async fn config_validation() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    service.create_vpn_config(&user, openvpn("Office")).await.unwrap();

    assert!(matches!(
        service.create_vpn_config(&user, openvpn("Office")).await,
        Err(NeosecError::VpnConfigNameTaken(_))
    ));

    let wrong_extension = NewVpnConfig {
        config_file_name: "office.conf".to_string(),
        ..openvpn("Mismatch")
    };
    assert!(matches!(
        service.create_vpn_config(&user, wrong_extension).await,
        Err(NeosecError::InvalidInput(field, _)) if field == "configFileName"
    ));

    let empty = NewVpnConfig {
        config_file_content: "  ".to_string(),
        ..openvpn("Empty")
    };
    assert!(matches!(
        service.create_vpn_config(&user, empty).await,
        Err(NeosecError::InvalidInput(field, _)) if field == "configFileContent"
    ));

    let oversized = NewVpnConfig {
        config_file_content: "a".repeat(1024 * 1024 + 1),
        ..openvpn("Huge")
    };
    assert!(matches!(
        service.create_vpn_config(&user, oversized).await,
        Err(NeosecError::InvalidInput(field, _)) if field == "configFileContent"
    ));

    for file_name in ["office\t.ovpn", "off\u{1}ice.ovpn", "office.ovpn\r\nX-Injected: 1"] {
        let control = NewVpnConfig {
            config_file_name: file_name.to_string(),
            ..openvpn("Control")
        };
        assert!(matches!(
            service.create_vpn_config(&user, control).await,
            Err(NeosecError::InvalidInput(field, _)) if field == "configFileName"
        ));
    }

    // Names only need to be unique per user.
    let other = register(&service, "other@neosec.io").await;
    assert!(service.create_vpn_config(&other, openvpn("Office")).await.is_ok());
}

#[tokio::test]
async fn toggle_keeps_at_most_one_active() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    let a = service.create_vpn_config(&user, openvpn("A")).await.unwrap();
    let b = service.create_vpn_config(&user, wireguard("B")).await.unwrap();

    assert!(service.toggle_vpn_config(&user, &a.id).await.unwrap().is_active);
    assert!(service.toggle_vpn_config(&user, &b.id).await.unwrap().is_active);

    let configs = service.list_vpn_configs(&user).await.unwrap();
    let active: Vec<_> = configs.iter().filter(|c| c.is_active).map(|c| c.id.clone()).collect();
    assert_eq!(active, vec![b.id.clone()]);

    // Toggling the active one turns it off.
    assert!(!service.toggle_vpn_config(&user, &b.id).await.unwrap().is_active);
    let configs = service.list_vpn_configs(&user).await.unwrap();
    assert!(configs.iter().all(|c| !c.is_active));
}

#[tokio::test]
async fn update_with_is_active_uses_exclusive_path() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    let a = service.create_vpn_config(&user, openvpn("A")).await.unwrap();
    let b = service.create_vpn_config(&user, wireguard("B")).await.unwrap();
    service.toggle_vpn_config(&user, &a.id).await.unwrap();

    let updated = service
        .update_vpn_config(
            &user,
            &b.id,
            VpnConfigUpdate {
                description: Some("Now primary".to_string()),
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.is_active);
    assert_eq!(updated.description.as_deref(), Some("Now primary"));
    assert!(!service.get_vpn_config(&user, &a.id).await.unwrap().is_active);
}

#[tokio::test]
async fn rename_to_taken_name_is_rejected() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    service.create_vpn_config(&user, openvpn("A")).await.unwrap();
    let b = service.create_vpn_config(&user, wireguard("B")).await.unwrap();

    let result = service
        .update_vpn_config(
            &user,
            &b.id,
            VpnConfigUpdate {
                name: Some("A".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(NeosecError::VpnConfigNameTaken(_))));

    // Keeping its own name is fine.
    let same = service
        .update_vpn_config(
            &user,
            &b.id,
            VpnConfigUpdate {
                name: Some("B".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(same.is_ok());
}

#[tokio::test]
async fn clone_picks_first_free_copy_name() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    let source = service.create_vpn_config(&user, openvpn("Office")).await.unwrap();
    service.toggle_vpn_config(&user, &source.id).await.unwrap();

    let first = service.clone_vpn_config(&user, &source.id).await.unwrap();
    let second = service.clone_vpn_config(&user, &source.id).await.unwrap();
    assert_eq!(first.name, "Office (Copy)");
    assert_eq!(second.name, "Office (Copy 2)");
    assert!(!first.is_active);
    assert_ne!(first.id, source.id);
    assert_eq!(first.config_file_content, source.config_file_content);
    assert_eq!(first.user_id, user.user.id);
}

#[tokio::test]
async fn download_uses_protocol_content_type() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    let ovpn = service.create_vpn_config(&user, openvpn("Office")).await.unwrap();
    let wg = service.create_vpn_config(&user, wireguard("Home")).await.unwrap();

    let download = service.download_vpn_config(&user, &ovpn.id).await.unwrap();
    assert_eq!(download.file_name, "office.ovpn");
    assert_eq!(download.content_type, "application/x-openvpn-profile");
    assert_eq!(download.content, ovpn.config_file_content);

    let download = service.download_vpn_config(&user, &wg.id).await.unwrap();
    assert!(download.content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn configs_are_private_to_their_owner() {
    let service = create_test_service();
    let owner = register(&service, "owner@neosec.io").await;
    let other = register(&service, "other@neosec.io").await;
    let config = service.create_vpn_config(&owner, openvpn("Office")).await.unwrap();

    assert!(matches!(
        service.get_vpn_config(&other, &config.id).await,
        Err(NeosecError::VpnConfigNotFound(_))
    ));
    assert!(matches!(
        service.toggle_vpn_config(&other, &config.id).await,
        Err(NeosecError::VpnConfigNotFound(_))
    ));
    assert!(matches!(
        service.delete_vpn_config(&other, &config.id).await,
        Err(NeosecError::VpnConfigNotFound(_))
    ));

    service.delete_vpn_config(&owner, &config.id).await.unwrap();
    assert!(service.list_vpn_configs(&owner).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_toggles_leave_one_active() {
    let service = Arc::new(create_test_service());
    let user = register(&service, "user@neosec.io").await;
    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(service.create_vpn_config(&user, openvpn(&format!("Tunnel {}", i))).await.unwrap().id);
    }

    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let service = Arc::clone(&service);
            let user = user.clone();
            tokio::spawn(async move { service.toggle_vpn_config(&user, &id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let configs = service.list_vpn_configs(&user).await.unwrap();
    assert!(configs.iter().filter(|c| c.is_active).count() <= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn edits_racing_toggles_keep_one_active() {
    let service = Arc::new(create_test_service());
    let user = register(&service, "user@neosec.io").await;
    let a = service.create_vpn_config(&user, openvpn("Office")).await.unwrap().id;
    let b = service.create_vpn_config(&user, wireguard("Home")).await.unwrap().id;
    service.toggle_vpn_config(&user, &a).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = Arc::clone(&service);
        let user = user.clone();
        let (a, b) = (a.clone(), b.clone());
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                let edit = VpnConfigUpdate {
                    description: Some(format!("edit {}", i)),
                    ..Default::default()
                };
                service.update_vpn_config(&user, &a, edit).await.map(|_| ())
            } else {
                let target = if i % 4 == 1 { &a } else { &b };
                service.toggle_vpn_config(&user, target).await.map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let configs = service.list_vpn_configs(&user).await.unwrap();
    assert!(configs.iter().filter(|c| c.is_active).count() <= 1);
}

#[tokio::test]
async fn description_edit_keeps_activation_state() {
    let service = create_test_service();
    let user = register(&service, "user@neosec.io").await;
    let a = service.create_vpn_config(&user, openvpn("Office")).await.unwrap();
    let b = service.create_vpn_config(&user, wireguard("Home")).await.unwrap();
    service.toggle_vpn_config(&user, &a.id).await.unwrap();
    service.toggle_vpn_config(&user, &b.id).await.unwrap();

    let edited = service
        .update_vpn_config(
            &user,
            &a.id,
            VpnConfigUpdate {
                description: Some("Backup tunnel".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!edited.is_active);
    assert!(service.get_vpn_config(&user, &b.id).await.unwrap().is_active);
}

use serde_json::{json, Value};
use subconvert::generator::proxy_to_uri;
use subconvert::parser::explode;
use subconvert::utils::base64_encode;
use subconvert::{
    merge_and_convert, parse, parse_mixed_subscription, subconvert, OverrideConfig, ProxyKind,
    ProxyType,
};

const TARGET_SS: &str = "ss://YWVzLTI1Ni1nY206dGVzdA==@10.0.0.1:8388#TargetSS";
const TARGET_SSR: &str = "ssr://MTkyLjE2OC4xLjE6ODM4ODphdXRoX2FlczEyOF9tZDU6YWVzLTI1Ni1jZmI6dGxzMS4yX3RpY2tldF9hdXRoOmRHVnpkQS8_cmVtYXJrcz1WR0Z5WjJWMFUxTlM";
const TARGET_TROJAN: &str = "trojan://password123@10.0.0.4:443?sni=example.com#TargetTrojan";

fn target_vmess() -> String {
    let config = json!({
        "v": "2",
        "ps": "TargetVMess",
        "add": "10.0.0.3",
        "port": "8443",
        "id": "b8be1234-5678-90ab-cdef-1234567890ab",
        "aid": "0",
        "net": "ws",
        "type": "none",
        "host": "vmess.example.com",
        "path": "/ws",
        "tls": "tls"
    });
    format!("vmess://{}", base64_encode(&config.to_string()))
}

fn target_subscription() -> String {
    [TARGET_SS.to_string(), TARGET_SSR.to_string(), target_vmess(), TARGET_TROJAN.to_string()]
        .join("\n")
}

fn lenient() -> OverrideConfig {
    OverrideConfig::default().with_skip_unsupported(true)
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_parse_sip002_link() {
        let nodes = parse("ss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.1:8388#Test").unwrap();
        assert_eq!(nodes.len(), 1);

        let node = &nodes[0];
        assert_eq!(node.proxy_type(), ProxyType::Shadowsocks);
        assert_eq!(node.server, "192.168.1.1");
        assert_eq!(node.port, 8388);
        assert_eq!(node.name, "Test");
        match &node.kind {
            ProxyKind::Shadowsocks {
                cipher, password, ..
            } => {
                assert_eq!(cipher, "aes-256-gcm");
                assert_eq!(password, "test");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_parse_target_subscription() {
        let nodes = parse(&target_subscription()).unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["TargetSS", "TargetSSR", "TargetVMess", "TargetTrojan"]);

        match &nodes[1].kind {
            ProxyKind::ShadowsocksR { protocol, .. } => assert_eq!(protocol, "auth_aes128_md5"),
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(nodes[1].server, "192.168.1.1");
        match &nodes[2].kind {
            ProxyKind::VMess { network, tls, .. } => {
                assert_eq!(network, "ws");
                assert!(tls);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_comment_lines_do_not_change_result() {
        let plain = target_subscription();
        let commented = format!("# comment\n\n{}", plain);
        assert_eq!(parse(&commented).unwrap(), parse(&plain).unwrap());

        let blob = base64_encode(&plain);
        let commented_blob = format!("# comment\n\n{}", blob);
        assert_eq!(parse(&commented_blob).unwrap(), parse(&blob).unwrap());
    }

    #[test]
    fn test_base64_blob_matches_plain() {
        let plain = "# comment\nss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.1:8388#Test1\n\ntrojan://password@192.168.1.2:443#Test2";
        let encoded = base64_encode(plain);
        let nodes = parse(&encoded).unwrap();
        assert_eq!(nodes, parse(plain).unwrap());
        assert_eq!(nodes[0].name, "Test1");
        assert_eq!(nodes[1].name, "Test2");
    }

    #[test]
    fn test_mixed_subscription_segments() {
        let first = "ss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.1:8388#Mixed1";
        let second = "trojan://password@192.168.1.2:443#Mixed2";
        let text = format!("{}|{}|not-a-link", first, base64_encode(second));

        let nodes = parse_mixed_subscription(&text);
        assert_eq!(nodes, vec![explode(first).unwrap(), explode(second).unwrap()]);

        let blob = base64_encode(&format!("{}\n{}", first, second));
        let nodes = parse_mixed_subscription(&format!("{}|{}", second, blob));
        assert_eq!(nodes, vec![explode(second).unwrap()]);
    }

    #[test]
    fn test_single_link_round_trip() {
        for node in parse(&target_subscription()).unwrap() {
            assert_eq!(explode(&proxy_to_uri(&node)).unwrap(), node);
        }
    }
}

#[cfg(test)]
mod convert_tests {
    use super::*;

    #[test]
    fn test_mixed_reparses_to_same_records() {
        let text = target_subscription();
        let output = subconvert(&text, "mixed", &OverrideConfig::default()).unwrap();
        assert_eq!(parse(&output).unwrap(), parse(&text).unwrap());
    }

    #[test]
    fn test_clash_yaml_sections() {
        let output = subconvert(
            "ss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.1:8388#Test",
            "clash",
            &OverrideConfig::default(),
        )
        .unwrap();
        assert!(output.contains("proxies:"));
        assert!(output.contains("proxy-groups:"));
        assert!(output.contains("MATCH,Proxy"));
    }

    #[test]
    fn test_clashr_json_lists_all_proxies() {
        let config = OverrideConfig::default().with_output_json(true);
        for target in ["clash", "clashr"] {
            let output = subconvert(&target_subscription(), target, &config).unwrap();
            let doc: Value = serde_json::from_str(&output).unwrap();

            assert_eq!(doc["proxies"].as_array().unwrap().len(), 4);
            let groups = doc["proxy-groups"].as_array().unwrap();
            assert!(groups.iter().any(|group| {
                ["TargetSS", "TargetSSR", "TargetVMess", "TargetTrojan"]
                    .iter()
                    .all(|name| group["proxies"].as_array().unwrap().contains(&json!(name)))
            }));
        }
    }

    #[test]
    fn test_v2ray_sections() {
        let output = subconvert(
            "ss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.1:8388#Test",
            "v2ray",
            &OverrideConfig::default(),
        )
        .unwrap();
        let doc: Value = serde_json::from_str(&output).unwrap();
        assert!(doc["inbounds"].is_array());
        assert!(doc["outbounds"].is_array());
        assert!(doc["routing"].is_object());
    }

    #[test]
    fn test_surge_lines() {
        let output = subconvert(&target_subscription(), "surge", &lenient()).unwrap();
        assert!(output.contains("[Proxy]"));
        assert!(output.contains("TargetSS = ss,"));
        assert!(output.contains("TargetVMess = custom,"));
        assert!(output.contains("TargetTrojan = trojan,"));
        assert!(!output.contains("TargetSSR"));
    }

    #[test]
    fn test_surge_rejects_ssr_by_default() {
        let err = subconvert(&target_subscription(), "surge", &OverrideConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "UnsupportedFeatureError");
    }

    #[test]
    fn test_quanx_tags() {
        let output =
            subconvert(&target_subscription(), "quanx", &OverrideConfig::default()).unwrap();
        assert!(output.contains("[server_local]"));
        for name in ["TargetSS", "TargetSSR", "TargetVMess", "TargetTrojan"] {
            assert!(output.contains(&format!("tag={}", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_singbox_outbound_tags() {
        let output = subconvert(&target_subscription(), "singbox", &lenient()).unwrap();
        let doc: Value = serde_json::from_str(&output).unwrap();
        let tags: Vec<&str> = doc["outbounds"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|outbound| outbound["tag"].as_str())
            .collect();
        assert_eq!(&tags[..3], ["TargetSS", "TargetVMess", "TargetTrojan"]);
    }

    #[test]
    fn test_single_protocol_targets() {
        let text = target_subscription();
        let config = OverrideConfig::default();
        for (target, name) in [
            ("ss", "TargetSS"),
            ("ssr", "TargetSSR"),
            ("vmess", "TargetVMess"),
            ("trojan", "TargetTrojan"),
        ] {
            let output = subconvert(&text, target, &config).unwrap();
            let node = explode(output.trim()).unwrap();
            assert_eq!(node.name, name);
        }

        let ss = explode(subconvert(&text, "ss", &config).unwrap().trim()).unwrap();
        assert_eq!(ss.server, "10.0.0.1");
        match explode(subconvert(&text, "trojan", &config).unwrap().trim()).unwrap().kind {
            ProxyKind::Trojan { sni, .. } => assert_eq!(sni, "example.com"),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_invalid_input_and_target() {
        let err = subconvert("", "clash", &OverrideConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "InvalidSubscriptionError");
        assert!(err.to_string().contains("Invalid subscription string"));

        let err = subconvert(TARGET_SS, "invalid", &OverrideConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "UnsupportedTargetError");
        assert!(err.to_string().contains("Unsupported target format"));
    }

    #[test]
    fn test_merge_and_convert_combines_sources() {
        let sub1 = "ss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.1:8388#Merge1";
        let sub2 = "ss://YWVzLTI1Ni1nY206dGVzdA==@192.168.1.2:8389#Merge2";
        let config = OverrideConfig::default().with_output_json(true);

        let output = merge_and_convert(&[sub1, sub2], "clash", &config).unwrap();
        let doc: Value = serde_json::from_str(&output).unwrap();
        let names: Vec<&str> = doc["proxies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|proxy| proxy["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Merge1", "Merge2"]);
    }

    #[test]
    fn test_override_groups_and_rules() {
        let config: OverrideConfig = serde_json::from_value(json!({
            "clashOptions": {
                "logLevel": "debug",
                "groups": [{
                    "name": "AI Services",
                    "type": "url-test",
                    "include-all": true,
                    "filter": "(?i)vmess|trojan"
                }],
                "rules": [
                    "DOMAIN-KEYWORD,openai,AI Services",
                    "DOMAIN-KEYWORD,openai,AI Services"
                ]
            },
            "outputJson": true
        }))
        .unwrap();

        let output = subconvert(&target_subscription(), "clash", &config).unwrap();
        let doc: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(doc["log-level"], "debug");
        assert_eq!(doc["proxy-groups"][0]["name"], "Proxy");
        assert_eq!(doc["proxy-groups"][1]["name"], "AI Services");
        assert_eq!(
            doc["proxy-groups"][1]["proxies"],
            json!(["TargetVMess", "TargetTrojan"])
        );
        assert_eq!(
            doc["rules"],
            json!(["DOMAIN-KEYWORD,openai,AI Services", "MATCH,Proxy"])
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let text = target_subscription();
        for target in ["clash", "surge", "quanx", "v2ray", "singbox", "mixed"] {
            let first = subconvert(&text, target, &lenient()).unwrap();
            let second = subconvert(&text, target, &lenient()).unwrap();
            assert_eq!(first, second, "{} output differs", target);
        }
    }
}

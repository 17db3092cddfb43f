pub mod clash_output;

#[cfg(test)]
mod tests {
    use super::clash_output::{ClashProxy, ClashProxyGroup, ClashYamlOutput, CommonProxyOptions};

    #[test]
    fn test_clash_document_shape() {
        let mut common = CommonProxyOptions::new("example-ss".to_string(), "example.com".to_string(), 8388);
        common.udp = Some(true);
        let doc = ClashYamlOutput {
            proxies: vec![ClashProxy::Shadowsocks {
                common,
                cipher: "aes-256-gcm".to_string(),
                password: "password".to_string(),
                plugin: None,
                plugin_opts: None,
            }],
            proxy_groups: vec![ClashProxyGroup::Select {
                name: "Proxy".to_string(),
                proxies: vec!["example-ss".to_string()],
            }],
            rules: vec!["MATCH,Proxy".to_string()],
            ..Default::default()
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["port"], 7890);
        assert_eq!(value["socks-port"], 7891);
        assert_eq!(value["allow-lan"], false);
        assert_eq!(value["mode"], "rule");
        assert_eq!(value["proxies"][0]["type"], "ss");
        assert_eq!(value["proxies"][0]["name"], "example-ss");
        assert_eq!(value["proxies"][0]["udp"], true);
        assert!(value["proxies"][0].get("plugin").is_none());
        assert_eq!(value["proxy-groups"][0]["type"], "select");

        let yaml = serde_yaml::to_string(&doc).unwrap();
        assert!(yaml.starts_with("port: 7890\n"));
        assert!(yaml.contains("proxy-groups:"));
        assert!(yaml.contains("- MATCH,Proxy"));
    }
}

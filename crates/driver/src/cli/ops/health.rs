use std::convert::Infallible;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();
        let root = base.as_str().trim_end_matches('/');

        let mut lines = vec![format!("Driver ({}):", base)];

        let livez_url = format!("{}/_status/livez", root);
        match client.get(&livez_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                lines.push("  livez:    OK".to_string());
            }
            Ok(resp) => {
                lines.push(format!("  livez:    UNHEALTHY ({})", resp.status()));
            }
            Err(_) => {
                lines.push("  livez:    NOT REACHABLE".to_string());
                return Ok(lines.join("\n"));
            }
        }

        let identity_url = format!("{}/_status/identity", root);
        match client.get(&identity_url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<serde_json::Value>().await {
                Ok(body) => {
                    let name = body["name"].as_str().unwrap_or("<unknown>");
                    lines.push(format!("  driver:   {}", name));
                }
                Err(e) => lines.push(format!("  driver:   unreadable response ({})", e)),
            },
            Ok(resp) => {
                lines.push(format!("  driver:   UNHEALTHY ({})", resp.status()));
            }
            Err(_) => {
                lines.push("  driver:   NOT REACHABLE".to_string());
            }
        }

        Ok(lines.join("\n"))
    }
}

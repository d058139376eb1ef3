//! Well-known OpenAI-compatible endpoints, shown by the `providers` command.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub base_url: &'static str,
}

const fn info(name: &'static str, base_url: &'static str) -> ProviderInfo {
    ProviderInfo { name, base_url }
}

pub const KNOWN_PROVIDERS: &[ProviderInfo] = &[
    info("OpenAI", "https://api.openai.com/v1"),
    info("Anthropic Claude", "https://api.anthropic.com"),
    info("Google Gemini", "https://generativelanguage.googleapis.com"),
    info("Mistral AI", "https://api.mistral.ai/v1"),
    info("Together AI", "https://api.together.xyz/v1"),
    info("Groq", "https://api.groq.com/openai/v1"),
    info("DeepSeek", "https://api.deepseek.com/v1"),
    info("Zhipu AI", "https://api.z.ai/api/coding/paas/v4"),
    info("Moonshot AI", "https://api.moonshot.cn/v1"),
    info("01.AI", "https://api.lingyiwanwu.com/v1"),
    info("MiniMax", "https://api.minimax.chat/v1"),
    info("StepFun", "https://api.stepfun.com/v1"),
    info("Baidu ERNIE", "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop"),
    info("Alibaba Tongyi", "https://dashscope.aliyuncs.com/compatible-mode/v1"),
    info("Tencent Hunyuan", "https://hunyuan.tencentcloudapi.com"),
    info("Local Ollama", "http://localhost:11434/v1"),
    info("LM Studio", "http://localhost:1234/v1"),
    info("Text Generation WebUI", "http://localhost:5000/v1"),
    info("LocalAI", "http://localhost:8080/v1"),
    info("vLLM", "http://localhost:8000/v1"),
    info("Perplexity", "https://api.perplexity.ai"),
    info("Fireworks AI", "https://api.fireworks.ai/inference/v1"),
    info("Replicate", "https://api.replicate.com/v1"),
    info("Anyscale", "https://api.endpoints.anyscale.com/v1"),
    info("Together Computer", "https://api.together.xyz/v1"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique() {
        let names: HashSet<_> = KNOWN_PROVIDERS.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), KNOWN_PROVIDERS.len());
    }

    #[test]
    fn test_directory_contents() {
        assert_eq!(KNOWN_PROVIDERS.len(), 25);
        assert_eq!(KNOWN_PROVIDERS[0].base_url, "https://api.openai.com/v1");
        let last = KNOWN_PROVIDERS[KNOWN_PROVIDERS.len() - 1];
        assert_eq!(last.name, "Together Computer");
        assert_eq!(last.base_url, "https://api.together.xyz/v1");
    }
}

fn band(score: f64) -> (&'static str, &'static str) {
    if score < 20.0 {
        ("纯爷们级别", "阳刚、直率、传统")
    } else if score < 40.0 {
        ("直男可爱级别", "可爱、温和、友善")
    } else if score < 60.0 {
        ("中性风格级别", "中性、平衡、灵活")
    } else if score < 80.0 {
        ("男娘潜力级别", "精致、细腻、敏感")
    } else if score < 90.0 {
        ("男娘爆发级别", "优雅、迷人、独特")
    } else {
        ("完美男娘级别", "完美、和谐、平衡")
    }
}

pub fn score_level(score: f64) -> &'static str {
    band(score).0
}

pub fn personality_traits(score: f64) -> &'static str {
    band(score).1
}

/// `score` is rendered exactly as the caller sent it.
pub fn build_prompt(name: &str, score: &serde_json::Number) -> String {
    let value = score.as_f64().unwrap_or_default();
    let (level, traits) = band(value);
    format!(
        "请为以下名字生成一段有趣的\"男娘特点个性化解析\"：\n\n\
         名字：{name}\n\
         男娘指数：{score}%\n\
         指数等级：{level}\n\
         性格特征：{traits}\n\n\
         要求：\n\
         1. 语言风格：轻松幽默，带有二次元风格\n\
         2. 内容长度：100-150字\n\
         3. 结合名字特点和指数分数进行分析\n\
         4. 包含具体的建议和鼓励\n\
         5. 避免过于刻板或冒犯性的描述\n\n\
         请生成一段有趣且个性化的分析："
    )
}

//! Prompt templates for title, article and image-keyword requests.
//!
//! The article prompts are written in Chinese because the tool targets
//! Chinese-language blogs; image search phrases are requested in English
//! because the image indexes are English-first.

pub const TITLE_SYSTEM: &str =
    "你是一个擅长自然写作的内容创作者，能写出真实、有温度、不套路的标题。\
     避免使用AI感强、营销腔的表达方式。";

pub const ARTICLE_SYSTEM: &str =
    "你是一个擅长自然写作的内容创作者，能写出真实、有温度、不套路的文章。\
     你的文章应该像真人在分享经验和见解，语气轻松自然，避免使用AI感强、\
     营销腔、官方腔的表达方式。文章使用HTML格式排版。";

pub const IMAGE_KEYWORD_SYSTEM: &str =
    "你是一个专业的图片搜索专家，擅长将中文主题转化为准确的英文图片搜索关键词。";

pub const IMAGE_PROMPT_SYSTEM: &str =
    "你是一个专业的提示词工程师，擅长将中文主题转化为高质量的英文图片生成提示词。";

/// Phrases that read as machine-written in titles; the model is told to
/// avoid them on top of any user-configured forbidden words.
const UNNATURAL_TITLE_WORDS: &[&str] = &[
    "深入探讨",
    "揭秘",
    "探索",
    "揭开",
    "完美",
    "深入剖析",
    "深入分析",
    "深入了解",
    "剖析",
    "深入",
    "终极指南",
    "全面解析",
    "带你了解",
];

const UNNATURAL_BODY_WORDS: &[&str] = &[
    "深入探讨",
    "揭秘",
    "探索",
    "揭开",
    "完美",
    "深入剖析",
    "引言",
    "总结",
    "结语",
    "综上所述",
    "首先",
    "其次",
    "最后",
    "在这篇文章中",
    "本文将",
    "让我们一起",
];

pub fn title_prompt(keyword: &str, n: usize, forbidden_words: &[String]) -> String {
    let forbidden_hint = if forbidden_words.is_empty() {
        String::new()
    } else {
        format!("\n7. 标题中不得包含以下词汇: {}", forbidden_words.join("、"))
    };

    format!(
        r#"请根据以下关键词生成 {n} 个自然风格的中文文章标题。关键词需自然融入，不要堆叠。

关键词: {keyword}

标题要求：
1. 标题需匹配所属领域（科技、影视、数码、知识科普）的常见写作语气
2. 避免AI感很强的词汇: {unnatural}
3. 不使用营销腔、官方腔的表达
4. 可以带些个人感受或真实体验感
5. 标题长度控制在15-30字之间
6. 适合SEO，关键词自然融入句子里{forbidden_hint}

请直接返回 {n} 个标题，每行一个，不要添加编号或其他说明:"#,
        n = n,
        keyword = keyword,
        unnatural = UNNATURAL_TITLE_WORDS.join("、"),
        forbidden_hint = forbidden_hint,
    )
}

pub fn article_prompt(
    title: &str,
    word_count: usize,
    image_count: usize,
    forbidden_words: &[String],
) -> String {
    let forbidden_hint = if forbidden_words.is_empty() {
        String::new()
    } else {
        format!("\n   - 文章中不得包含以下词汇: {}", forbidden_words.join("、"))
    };

    format!(
        r#"请根据以下标题撰写一篇自然、真实、有温度的中文文章。

标题: {title}

写作风格：
1. 像一个真实的人在分享经验和见解，语气轻松自然
2. 使用日常对话的语言，避免官方腔调和营销话术
3. 可以用"我""你""咱们"等人称，增加亲切感
4. 避免使用这些AI感很强的词汇: {unnatural}

内容要求：
1. HTML标签格式排版：段落用 <p>，小标题用 <h2> 或 <h3>，强调用 <strong>，
   列表用 <ul> 和 <li>；不要生成完整的 HTML 文档结构
   （如 <!DOCTYPE>、<html>、<head>、<body>），只生成文章内容部分
2. 原创内容，逻辑自然流畅，目标字数约 {word_count} 字{forbidden_hint}
3. 开头自然切入主题，中间用 2-4 个口语化小标题组织内容，结尾自然收束
4. 在合适的位置插入 {image_count} 个图片占位符，
   格式: <img src="[IMAGE_PLACEHOLDER]" alt="相关描述">，描述要具体、符合上下文

请开始创作（仅返回文章内容的HTML，不要添加任何说明或注释）:"#,
        title = title,
        word_count = word_count,
        unnatural = UNNATURAL_BODY_WORDS.join("、"),
        forbidden_hint = forbidden_hint,
        image_count = image_count,
    )
}

/// Article segment requested in template mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Intro,
    Body,
    Conclusion,
}

impl Segment {
    pub fn label(self) -> &'static str {
        match self {
            Segment::Intro => "开头",
            Segment::Body => "主体",
            Segment::Conclusion => "结尾",
        }
    }

    /// Placeholder slot this segment fills in the configured template.
    pub fn placeholder(self) -> &'static str {
        match self {
            Segment::Intro => "{intro}",
            Segment::Body => "{body}",
            Segment::Conclusion => "{conclusion}",
        }
    }
}

pub fn segment_prompt(
    title: &str,
    segment: Segment,
    word_count: usize,
    forbidden_words: &[String],
) -> String {
    let forbidden_hint = if forbidden_words.is_empty() {
        String::new()
    } else {
        format!("\n4. 不得包含以下词汇: {}", forbidden_words.join("、"))
    };

    // Intro and conclusion get a fifth of the word count each, the body
    // gets the rest.
    let segment_words = match segment {
        Segment::Intro | Segment::Conclusion => word_count / 5,
        Segment::Body => word_count - 2 * (word_count / 5),
    };

    format!(
        r#"请根据以下标题撰写文章的{label}部分。

标题: {title}

要求：
1. 语气自然、真实，像真人在分享
2. 使用HTML标签排版（<p>、<h2>、<h3>、<strong>、<ul>/<li>），不要文档结构标签
3. 目标字数约 {segment_words} 字{forbidden_hint}

请直接返回这一部分的HTML，不要添加任何说明:"#,
        label = segment.label(),
        title = title,
        segment_words = segment_words,
        forbidden_hint = forbidden_hint,
    )
}

pub fn image_keywords_prompt(title: &str, count: usize) -> String {
    format!(
        r#"请根据以下文章标题，生成 {count} 个适合搜索图片的英文关键词。

文章标题: {title}

要求:
1. 关键词要能准确反映文章的主题和内容
2. 使用简洁的英文单词或短语（2-4个词）
3. 每个关键词从不同角度描述主题

请直接返回 {count} 个关键词，每行一个，不要添加编号或其他说明:"#,
        count = count,
        title = title,
    )
}

pub fn image_gen_prompts_prompt(title: &str, count: usize) -> String {
    format!(
        r#"请根据以下文章标题，生成 {count} 个适合AI图片生成的英文提示词。

文章标题: {title}

要求:
1. 提示词要详细描述期望的图片场景和风格（一句话，15-30个词）
2. 包含主题、风格、构图等元素，适合生成专业配图

请直接返回 {count} 个提示词，每行一个，不要添加编号或其他说明:"#,
        count = count,
        title = title,
    )
}

//! Prompt assembly for each generator.
//!
//! Builders are pure functions of the client's saved profile design, brand
//! strategy and the request. Unset inputs render as `未設定` so the model sees
//! every slot.

use xopt_core::{
    PostCategory, PostHook, PostTemplate, ProfileDesignInput, StrategyCategory, StrategyContent,
    StrategySection, TemplateStructurePart,
};

use crate::types::{PostRequest, StructuredPostRequest};

const UNSET: &str = "未設定";
const DEFAULT_TONE: &str = "プロフェッショナル";
const JSON_ONLY: &str = "JSONのみを出力し、他の説明は不要です。";

/// Strategy sections quoted when drafting keyword ideas.
const KEYWORD_SECTIONS: &[StrategySection] = &[
    StrategySection::Mission,
    StrategySection::Vision,
    StrategySection::Values,
    StrategySection::SocialProof,
    StrategySection::Authority,
    StrategySection::PersonaPainPoints,
    StrategySection::PersonaDesires,
    StrategySection::PersonaTriggers,
    StrategySection::UniqueFeatures,
    StrategySection::Differentiation,
    StrategySection::Expertise,
    StrategySection::Transformation,
    StrategySection::ContentPillars,
    StrategySection::PostingStrategy,
    StrategySection::BackgroundStory,
    StrategySection::Passion,
];

const POST_SECTIONS: &[StrategySection] = &[
    StrategySection::Mission,
    StrategySection::Vision,
    StrategySection::Values,
    StrategySection::PersonaPainPoints,
    StrategySection::PersonaDesires,
    StrategySection::UniqueFeatures,
    StrategySection::Differentiation,
    StrategySection::Transformation,
    StrategySection::ContentPillars,
    StrategySection::PostingStrategy,
    StrategySection::Passion,
];

const STRUCTURED_POST_SECTIONS: &[StrategySection] = &[
    StrategySection::PersonaPainPoints,
    StrategySection::PersonaDesires,
    StrategySection::UniqueFeatures,
    StrategySection::Differentiation,
    StrategySection::Transformation,
    StrategySection::Passion,
];

/// What is known about a client when a prompt is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct Brief<'a> {
    pub profile: Option<&'a ProfileDesignInput>,
    pub strategy: Option<&'a StrategyContent>,
}

fn or_unset(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNSET)
}

fn persona_text(profile: &ProfileDesignInput) -> String {
    profile
        .target_persona
        .as_ref()
        .map(xopt_core::TargetPersona::summary)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNSET.to_string())
}

fn profile_lines(profile: &ProfileDesignInput, with_career: bool) -> Vec<String> {
    let mut lines = vec![
        format!("- ターゲットペルソナ: {}", persona_text(profile)),
        format!("- 提供する価値: {}", or_unset(profile.what_to_deliver.as_deref())),
        format!("- 約束する未来: {}", or_unset(profile.future_promise.as_deref())),
        format!("- 実績: {}", or_unset(profile.achievements.as_deref())),
    ];
    if with_career {
        lines.push(format!(
            "- 経歴: {}",
            or_unset(profile.career_history.as_deref())
        ));
    }
    lines
}

fn profile_block(profile: &ProfileDesignInput, heading: &str, with_career: bool) -> String {
    let mut lines = vec![format!("## {heading}")];
    lines.extend(profile_lines(profile, with_career));
    lines.join("\n")
}

/// Renders the chosen sections grouped under their category headings.
fn strategy_block(strategy: &StrategyContent, sections: &[StrategySection]) -> String {
    let mut lines = vec!["## 全体設計（ブランド戦略）".to_string()];
    for category in StrategyCategory::ALL {
        let in_group: Vec<StrategySection> = sections
            .iter()
            .copied()
            .filter(|s| s.category() == *category)
            .collect();
        if in_group.is_empty() {
            continue;
        }
        lines.push(format!("### {}", category.label()));
        for section in in_group {
            lines.push(format!(
                "- {}: {}",
                section.label(),
                or_unset(strategy.get(section))
            ));
        }
    }
    lines.join("\n")
}

fn category_label(category: Option<PostCategory>) -> &'static str {
    category.unwrap_or(PostCategory::Other).prompt_label()
}

/// Renders template parts sorted by `order` as a numbered list.
#[must_use]
pub fn structure_lines(parts: &[&TemplateStructurePart]) -> String {
    parts
        .iter()
        .enumerate()
        .map(|(idx, part)| {
            let limit = part
                .char_limit
                .map(|n| format!("（目安{n}文字）"))
                .unwrap_or_default();
            format!("{}. {}{}: {}", idx + 1, part.name, limit, part.prompt)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn template_block(template: &PostTemplate) -> String {
    let mut lines = vec![format!("## 使用する構文テンプレート: {}", template.name)];
    if let Some(description) = template.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(format!("説明: {description}"));
    }
    lines.push("### 本文の構成".to_string());
    lines.push(structure_lines(&template.ordered_structure()));
    let reply = template.ordered_reply_structure();
    if !reply.is_empty() {
        lines.push(String::new());
        lines.push("### リプ欄（スレッド）の構成".to_string());
        lines.push(structure_lines(&reply));
    }
    lines.join("\n")
}

fn hook_block(hook: &PostHook) -> String {
    format!(
        "## 使用するフック（書き出し）\n「{}」を使って投稿を始めてください。\nフックの特徴: {}",
        hook.hook_text,
        hook.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("なし")
    )
}

fn join_blocks(blocks: Vec<String>) -> String {
    blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt for the profile text, header copy and pinned post.
#[must_use]
pub fn profile_prompt(profile: &ProfileDesignInput) -> String {
    join_blocks(vec![
        "あなたはX（Twitter）のプロフィール作成の専門家です。以下の情報を基に、魅力的で効果的なXプロフィール文を生成してください。".to_string(),
        profile_block(profile, "入力情報", true),
        [
            "## 要件",
            "1. プロフィール文は160文字以内",
            "2. ターゲットに響く言葉を使用",
            "3. 実績や権威性を適切に表現",
            "4. 行動を促すCTAを含める",
            "5. 絵文字は控えめに使用（最大2-3個）",
        ]
        .join("\n"),
        [
            "## 出力形式",
            "以下のJSON形式で出力してください：",
            "{",
            "  \"profileText\": \"生成したプロフィール文\",",
            "  \"headerCopy\": \"ヘッダー画像用のキャッチコピー（20文字以内）\",",
            "  \"fixedTweet\": \"固定ツイート用の文章（280文字以内）\"",
            "}",
            JSON_ONLY,
        ]
        .join("\n"),
    ])
}

/// Prompt for one brand-strategy section, returned as plain text.
#[must_use]
pub fn strategy_section_prompt(section: StrategySection, brief: Brief<'_>) -> String {
    let empty = ProfileDesignInput::default();
    let profile = brief.profile.unwrap_or(&empty);

    let existing: Vec<String> = brief
        .strategy
        .map(|s| {
            s.filled_sections()
                .into_iter()
                .filter(|(filled, _)| *filled != section)
                .map(|(filled, text)| format!("- {}: {}", filled.key(), text))
                .collect()
        })
        .unwrap_or_default();
    let existing = if existing.is_empty() {
        "（まだ入力されていません）".to_string()
    } else {
        existing.join("\n")
    };

    join_blocks(vec![
        format!(
            "あなたはX（Twitter）ブランディング戦略の専門家です。\n以下のプロフィール情報をもとに、「{}」の内容を生成してください。",
            section.label()
        ),
        profile_block(profile, "プロフィール情報", true),
        format!("## 既に入力済みの全体設計\n{existing}"),
        format!(
            "## 生成するセクション\n- セクション名: {}\n- 説明: {}",
            section.label(),
            section.description()
        ),
        format!("## カテゴリ別ガイドライン\n{}", section.category().guideline()),
        [
            "## 要件",
            "1. プロフィール情報と既存の全体設計との一貫性を保つ",
            "2. 具体的で実践的な内容にする",
            "3. X（Twitter）での発信を前提とした内容にする",
            "4. 200〜400文字程度で生成する",
            "5. 箇条書きと文章を適宜組み合わせる",
        ]
        .join("\n"),
        "生成する内容のみを出力してください。説明や前置きは不要です。".to_string(),
    ])
}

/// Prompt for a batch of keyword ideas, avoiding themes already in use.
#[must_use]
pub fn keywords_prompt(brief: Brief<'_>, existing_keywords: &[String]) -> String {
    let empty = ProfileDesignInput::default();
    let profile = brief.profile.unwrap_or(&empty);
    let avoid = if existing_keywords.is_empty() {
        String::new()
    } else {
        format!(
            "## 既に使用済みのキーワード（避ける）\n{}",
            existing_keywords.join("\n")
        )
    };

    join_blocks(vec![
        "あなたはX（Twitter）コンテンツ戦略の専門家です。以下のプロフィール情報と全体設計を分析し、投稿のテーマ・キーワード候補を大量に生成してください。".to_string(),
        profile_block(profile, "プロフィール情報", true),
        brief
            .strategy
            .map(|s| strategy_block(s, KEYWORD_SECTIONS))
            .unwrap_or_default(),
        avoid,
        [
            "## 要件",
            "1. ターゲットが「読みたい」「共感する」「学びたい」と思うテーマを選ぶ",
            "2. 有益系と共感系をバランスよく含める",
            "3. 具体的で投稿に落とし込みやすいキーワードにする",
            "4. 最低20個のキーワード候補を出す",
        ]
        .join("\n"),
        [
            "## カテゴリ",
            "- useful（有益系）: ノウハウ、Tips、数字で語る実績、学び",
            "- empathy（共感系）: 日常の気づき、失敗談、本音、共感を呼ぶ経験",
        ]
        .join("\n"),
        [
            "## 出力形式",
            "以下のJSON形式で出力してください：",
            "{",
            "  \"keywords\": [",
            "    {",
            "      \"theme\": \"テーマ名\",",
            "      \"description\": \"このテーマで書く内容の概要\",",
            "      \"category\": \"useful\" または \"empathy\",",
            "      \"hooks\": [\"フック案1\", \"フック案2\"]",
            "    }",
            "  ]",
            "}",
            JSON_ONLY,
        ]
        .join("\n"),
    ])
}

fn input_block(
    theme: Option<&str>,
    category: Option<PostCategory>,
    tone: Option<&str>,
    extra: Option<String>,
) -> String {
    let mut lines = vec![
        "## 入力情報".to_string(),
        format!("- テーマ/キーワード: {}", or_unset(theme)),
        format!("- カテゴリ: {}", category_label(category)),
        format!(
            "- トーン: {}",
            tone.map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TONE)
        ),
    ];
    lines.extend(extra);
    lines.join("\n")
}

/// Prompt for a single free-form post.
#[must_use]
pub fn post_prompt(request: &PostRequest, brief: Brief<'_>) -> String {
    let reference = (!request.existing_ideas.is_empty()).then(|| {
        format!(
            "- 参考にする既存の投稿アイデア:\n{}",
            request.existing_ideas.join("\n")
        )
    });

    join_blocks(vec![
        "あなたはX（Twitter）投稿の専門家です。以下の情報を基に、エンゲージメントの高い投稿文を生成してください。".to_string(),
        brief
            .profile
            .map(|p| profile_block(p, "プロフィール情報", false))
            .unwrap_or_default(),
        brief
            .strategy
            .map(|s| strategy_block(s, POST_SECTIONS))
            .unwrap_or_default(),
        input_block(
            request.theme.as_deref(),
            request.category,
            request.tone.as_deref(),
            reference,
        ),
        [
            "## カテゴリ別の特徴",
            "- 有益系: 具体的なノウハウ、数字を使った説得力、学びがある内容",
            "- 共感系: 感情に訴える、「わかる」と思わせる、日常の気づき",
        ]
        .join("\n"),
        [
            "## 要件",
            "1. 280文字以内（日本語）",
            "2. 冒頭でフックを作る（読み手の興味を引く）",
            "3. 改行を効果的に使う",
            "4. ハッシュタグは0-2個まで",
            "5. 絵文字は控えめに（0-2個）",
        ]
        .join("\n"),
        [
            "## 出力形式",
            "以下のJSON形式で出力してください：",
            "{",
            "  \"content\": \"生成した投稿文\",",
            "  \"title\": \"投稿のタイトル（管理用、20文字以内）\",",
            "  \"tags\": [\"タグ1\", \"タグ2\"],",
            "  \"characterCount\": 文字数",
            "}",
            JSON_ONLY,
        ]
        .join("\n"),
    ])
}

/// Prompt for a post that opens with `hook` and follows `template`.
#[must_use]
pub fn structured_post_prompt(
    request: &StructuredPostRequest,
    brief: Brief<'_>,
    hook: Option<&PostHook>,
    template: Option<&PostTemplate>,
) -> String {
    let with_thread = template.is_some_and(|t| !t.ordered_reply_structure().is_empty());
    let instructions = request
        .custom_instructions
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(|i| format!("- 追加指示: {i}"));

    let opening = match hook {
        Some(h) => format!("2. 「{}」で始める", h.hook_text),
        None => "2. 冒頭でフックを作る（読み手の興味を引く）".to_string(),
    };
    let mut requirements = vec![
        "## 基本要件".to_string(),
        "1. 本文は280文字以内（日本語）".to_string(),
        opening,
        "3. 改行を効果的に使う".to_string(),
        "4. ハッシュタグは0-2個まで".to_string(),
        "5. 絵文字は控えめに（0-2個）".to_string(),
    ];
    if with_thread {
        requirements.push("6. リプ欄（スレッド）も生成する".to_string());
    }

    let mut output = vec![
        "## 出力形式".to_string(),
        "以下のJSON形式で出力してください：".to_string(),
        "{".to_string(),
        "  \"content\": \"生成した本文\",".to_string(),
        "  \"title\": \"投稿のタイトル（管理用、20文字以内）\",".to_string(),
        "  \"tags\": [\"タグ1\", \"タグ2\"],".to_string(),
        "  \"characterCount\": 本文の文字数,".to_string(),
    ];
    if with_thread {
        output.push(
            "  \"replyThread\": [\n    {\n      \"content\": \"リプ欄1の内容\",\n      \"characterCount\": 文字数\n    }\n  ],"
                .to_string(),
        );
    }
    output.push(format!(
        "  \"structureUsed\": {{\n    \"templateName\": \"{}\",\n    \"hookUsed\": \"{}\"\n  }}",
        template.map_or("なし", |t| t.name.as_str()),
        hook.map_or("なし", |h| h.hook_text.as_str())
    ));
    output.push("}".to_string());
    output.push(JSON_ONLY.to_string());

    join_blocks(vec![
        "あなたはX（Twitter）投稿の専門家です。以下の情報と構成に従って、エンゲージメントの高い投稿文を生成してください。".to_string(),
        brief
            .profile
            .map(|p| profile_block(p, "プロフィール情報", false))
            .unwrap_or_default(),
        brief
            .strategy
            .map(|s| strategy_block(s, STRUCTURED_POST_SECTIONS))
            .unwrap_or_default(),
        hook.map(hook_block).unwrap_or_default(),
        template.map(template_block).unwrap_or_default(),
        input_block(
            request.theme.as_deref(),
            request.category,
            request.tone.as_deref(),
            instructions,
        ),
        requirements.join("\n"),
        output.join("\n"),
    ])
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;

//! Static system prompts and few-shot examples per diagram type.

use crate::models::DiagramType;
use std::collections::HashMap;
use thiserror::Error;

/// An (input, output) pair embedded in the prompt to steer the output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FewShotExample {
    pub input: &'static str,
    pub output: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramConfig {
    pub system_prompt: &'static str,
    pub few_shot_examples: Vec<FewShotExample>,
}

impl DiagramConfig {
    /// System prompt followed by the numbered few-shot block, if any.
    pub fn build_prompt(&self) -> String {
        let mut prompt = self.system_prompt.to_string();

        if !self.few_shot_examples.is_empty() {
            prompt.push_str("\n\n**학습 예제**:\n");
            for (i, example) in self.few_shot_examples.iter().enumerate() {
                prompt.push_str(&format!("\n예제 {}:\n", i + 1));
                prompt.push_str(&format!("입력: \"{}\"\n", example.input));
                prompt.push_str(&format!("출력:\n{}\n", example.output));
            }
        }

        prompt
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown diagram type: {0}")]
pub struct CatalogError(pub String);

/// Read-only lookup from diagram type to its prompt configuration.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    configs: HashMap<DiagramType, DiagramConfig>,
}

impl PromptCatalog {
    /// Catalog covering every [`DiagramType`].
    pub fn builtin() -> Self {
        let configs = DiagramType::ALL
            .into_iter()
            .map(|t| (t, builtin_config(t)))
            .collect();
        Self { configs }
    }

    /// Catalog with only the given entries.
    pub fn from_configs(configs: impl IntoIterator<Item = (DiagramType, DiagramConfig)>) -> Self {
        Self {
            configs: configs.into_iter().collect(),
        }
    }

    /// Look up a type. A missing entry is an error, never a default.
    pub fn get(&self, diagram_type: DiagramType) -> Result<&DiagramConfig, CatalogError> {
        self.configs
            .get(&diagram_type)
            .ok_or_else(|| CatalogError(diagram_type.to_string()))
    }

    /// Look up by wire tag.
    pub fn lookup(&self, tag: &str) -> Result<&DiagramConfig, CatalogError> {
        let diagram_type = tag
            .parse::<DiagramType>()
            .map_err(|_| CatalogError(tag.to_string()))?;
        self.get(diagram_type)
    }

    pub fn build_prompt(&self, diagram_type: DiagramType) -> Result<String, CatalogError> {
        self.get(diagram_type).map(DiagramConfig::build_prompt)
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_config(diagram_type: DiagramType) -> DiagramConfig {
    match diagram_type {
        DiagramType::Flowchart => DiagramConfig {
            system_prompt: FLOWCHART_PROMPT,
            few_shot_examples: vec![
                FewShotExample {
                    input: "회원가입 프로세스",
                    output: "flowchart TD
    A[시작] --> B[이메일 입력]
    B --> C[비밀번호 입력]
    C --> D{유효성 검사}
    D -->|통과| E[가입 완료]
    D -->|실패| B",
                },
                FewShotExample {
                    input: "결제 프로세스",
                    output: "flowchart TD
    A[장바구니] --> B{재고 확인}
    B -->|있음| C[결제]
    B -->|없음| D[품절 알림]
    C --> E{결제 성공?}
    E -->|예| F[주문 완료]
    E -->|아니오| C",
                },
                FewShotExample {
                    input: "API 요청 처리",
                    output: "flowchart TD
    A[요청] --> B{인증}
    B -->|통과| C[처리]
    B -->|실패| D[401]
    C --> E{성공}
    E -->|예| F[200]
    E -->|아니오| G[500]",
                },
            ],
        },
        DiagramType::Pie => DiagramConfig {
            system_prompt: PIE_PROMPT,
            few_shot_examples: vec![FewShotExample {
                input: "월별 매출 비중",
                output: "pie title 월별 매출 비중
    \"1월\" : 25
    \"2월\" : 30
    \"3월\" : 45",
            }],
        },
        DiagramType::Sequence => DiagramConfig {
            system_prompt: SEQUENCE_PROMPT,
            few_shot_examples: Vec::new(),
        },
        DiagramType::Gantt => DiagramConfig {
            system_prompt: GANTT_PROMPT,
            few_shot_examples: Vec::new(),
        },
        DiagramType::EntityRelationship => DiagramConfig {
            system_prompt: ER_PROMPT,
            few_shot_examples: Vec::new(),
        },
        DiagramType::State => DiagramConfig {
            system_prompt: STATE_PROMPT,
            few_shot_examples: Vec::new(),
        },
        DiagramType::Journey => DiagramConfig {
            system_prompt: JOURNEY_PROMPT,
            few_shot_examples: Vec::new(),
        },
        DiagramType::Graph => DiagramConfig {
            system_prompt: GRAPH_PROMPT,
            few_shot_examples: Vec::new(),
        },
    }
}

const FLOWCHART_PROMPT: &str = "당신은 Mermaid 플로우차트 전문가입니다.

**중요 규칙**:
1. 반드시 `flowchart TD` 또는 `flowchart LR`로 시작
2. 노드 ID는 영문 (A, B, C 등)
3. 한국어 라벨은 대괄호 안에: A[시작]
4. 조건 분기는 중괄호: B{로그인?}
5. 화살표 라벨은 파이프: A -->|예| B
6. 코드만 출력 (설명, 마크다운 블록 금지)";

const PIE_PROMPT: &str = "당신은 Mermaid 파이 차트 전문가입니다.

**중요 규칙**:
1. 반드시 `pie`로 시작
2. title 라인 추가 (선택)
3. 데이터 포맷: \"라벨\" : 숫자 (퍼센트 아님!)
4. 숫자 합계 무관 (Mermaid가 자동 비율 계산)
5. 한국어 라벨 사용
6. 코드만 출력 (설명, 마크다운 블록 금지)";

const SEQUENCE_PROMPT: &str = "당신은 Mermaid 시퀀스 다이어그램 전문가입니다.

**중요 규칙**:
1. 반드시 `sequenceDiagram`으로 시작
2. participant로 참여자 정의
3. 화살표: -> (실선), --> (점선)
4. 한국어 라벨 사용
5. 코드만 출력";

const GANTT_PROMPT: &str = "당신은 Mermaid 간트 차트 전문가입니다.

**중요 규칙**:
1. 반드시 `gantt`로 시작
2. dateFormat 지정
3. section으로 그룹화
4. 날짜 형식 정확히
5. 코드만 출력";

const ER_PROMPT: &str = "당신은 Mermaid ER 다이어그램 전문가입니다.

**중요 규칙**:
1. 반드시 `erDiagram`으로 시작
2. 엔티티와 속성 정의
3. 관계 표현 (||--o{, }o--||, etc.)
4. 한국어 설명 가능
5. 코드만 출력";

const STATE_PROMPT: &str = "당신은 Mermaid 상태 다이어그램 전문가입니다.

**중요 규칙**:
1. 반드시 `stateDiagram-v2`로 시작
2. 상태 전환 화살표 사용
3. 한국어 상태명 가능
4. 코드만 출력";

const JOURNEY_PROMPT: &str = "당신은 Mermaid User Journey 전문가입니다.

**중요 규칙**:
1. 반드시 `journey`로 시작
2. title 추가
3. 단계별 점수 표시
4. 한국어 라벨 사용
5. 코드만 출력";

const GRAPH_PROMPT: &str = "당신은 Mermaid 그래프/조직도 전문가입니다.

**중요 규칙**:
1. 반드시 `graph TD` 또는 `graph LR`로 시작
2. 노드 연결 표현
3. 한국어 라벨 사용
4. 코드만 출력";

use askama::Template;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;

/// Static content of an informational page.
pub struct Guide {
    pub title: &'static str,
    pub intro: &'static str,
    pub sample_title: &'static str,
    pub sample_body: &'static str,
}

pub const TIPS: Guide = Guide {
    title: "꿀팁 게시판",
    intro: "피망 포커 전략, 운영 팁, 생활 꿀팁 등을 공유하는 공간입니다. 나중에는 여러 꿀팁 글이 리스트 형태로 올라가게 됩니다.",
    sample_title: "예시 꿀팁: 초보를 위한 기본 베팅 전략",
    sample_body: "프리플랍에서는 너무 많은 핸드를 플레이하지 말고, 포지션에 따라 선택적으로 참여하는 것이 좋습니다. 자세한 전략 글이 이 영역에 들어가게 됩니다.",
};

pub const QNA: Guide = Guide {
    title: "Q&A 게시판",
    intro: "피망 포커와 관련된 궁금한 점을 자유롭게 물어보는 공간입니다. 추후 자유게시판처럼 목록형 게시판으로 확장될 예정입니다.",
    sample_title: "예시 질문: 피망머니 환불 어떻게 하나요?",
    sample_body: "피망머니를 잘못 충전했는데 환불이 가능한가요? 실제 운영 정책과 절차에 대한 안내 글이 이 영역에 들어가게 됩니다.",
};

pub const MONEY_GUIDE: Guide = Guide {
    title: "피망머니 가이드",
    intro: "피망머니 충전, 사용, 주의사항 등을 정리하는 가이드 페이지입니다. 실제 운영 정책이 정리되면 이곳에 상세 안내가 들어갑니다.",
    sample_title: "예시 안내: 피망머니 충전 기본 규칙",
    sample_body: "피망머니는 성인만 이용 가능하며, 과도한 충전은 도박 중독의 위험을 높일 수 있습니다. 책임 있는 게임 이용을 위해 충전 한도를 스스로 관리해 주세요.",
};

pub const POKER_GUIDE: Guide = Guide {
    title: "포커 기초 가이드",
    intro: "텍사스 홀덤 규칙, 족보, 기본 전략 등을 정리하는 입문용 가이드입니다. 이후에는 여러 편의 가이드 글로 나누어질 수 있습니다.",
    sample_title: "예시 가이드: 포커 족보 한눈에 보기",
    sample_body: "로열 스트레이트 플러시 > 스트레이트 플러시 > 포카드 > 풀하우스 > 플러시 > 스트레이트 > 트리플 > 투페어 > 원페어 > 하이카드 순서로 족보가 결정됩니다.",
};

#[derive(Template)]
#[template(path = "pages/guide.html")]
pub struct GuideTemplate {
    pub nav: Nav,
    pub guide: &'static Guide,
}

#[derive(Template)]
#[template(path = "pages/exchange.html")]
pub struct ExchangeTemplate {
    pub nav: Nav,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tips", get(tips))
        .route("/qna", get(qna))
        .route("/money-guide", get(money_guide))
        .route("/poker-guide", get(poker_guide))
        .route("/exchange", get(exchange))
}

fn render(maybe_user: MaybeUser, guide: &'static Guide) -> AppResult<Response> {
    Ok(Html(GuideTemplate {
        nav: Nav::new(maybe_user.0.as_ref()),
        guide,
    })
    .into_response())
}

async fn tips(maybe_user: MaybeUser) -> AppResult<Response> {
    render(maybe_user, &TIPS)
}

async fn qna(maybe_user: MaybeUser) -> AppResult<Response> {
    render(maybe_user, &QNA)
}

async fn money_guide(maybe_user: MaybeUser) -> AppResult<Response> {
    render(maybe_user, &MONEY_GUIDE)
}

async fn poker_guide(maybe_user: MaybeUser) -> AppResult<Response> {
    render(maybe_user, &POKER_GUIDE)
}

async fn exchange(maybe_user: MaybeUser) -> AppResult<Response> {
    Ok(Html(ExchangeTemplate {
        nav: Nav::new(maybe_user.0.as_ref()),
    })
    .into_response())
}

//! Reply texts for each step of the intake conversation.

use super::model::{ProjectType, Room, Unit};

/// Renders the assistant's replies with the configured business identity.
#[derive(Debug, Clone)]
pub struct Prompts {
    business_name: String,
    assistant_name: String,
}

impl Prompts {
    pub fn new(business_name: impl Into<String>, assistant_name: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            assistant_name: assistant_name.into(),
        }
    }

    fn unit_menu() -> String {
        format!(
            "1️⃣ para **{}**\n2️⃣ para **{}**",
            Unit::Ijui.label(),
            Unit::Catuipe.label()
        )
    }

    fn project_menu() -> String {
        format!(
            "1️⃣ {}\n2️⃣ {}",
            ProjectType::HasArchitectPlan.label(),
            ProjectType::NeedsNewPlan.label()
        )
    }

    fn room_menu() -> String {
        const KEYS: [&str; 6] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣"];
        KEYS.iter()
            .zip(Room::VOCABULARY)
            .map(|(key, room)| format!("{key} {room}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn welcome(&self) -> String {
        format!(
            "Olá, seja bem-vindo(a) à **{business}**! ✨\n\n\
             Eu sou a **{assistant}**, assistente virtual da nossa equipe.\n\n\
             Para começar, me diga:\n\
             📍 Você prefere falar com a nossa unidade de **{a}** ou de **{b}**?\n\n\
             Digite:\n{menu}",
            business = self.business_name,
            assistant = self.assistant_name,
            a = Unit::Ijui.label(),
            b = Unit::Catuipe.label(),
            menu = Self::unit_menu(),
        )
    }

    pub fn unit_reprompt(&self) -> String {
        format!("Por favor, escolha uma das opções:\n\n{}", Self::unit_menu())
    }

    pub fn ask_name(&self, unit: Unit) -> String {
        format!(
            "Perfeito! Vou te conectar com nossa unidade de **{unit}**! 🎉\n\n\
             Agora preciso de algumas informações básicas:\n\n\
             Qual é o seu **nome completo**?"
        )
    }

    pub fn name_reprompt(&self) -> String {
        "Por favor, me informe seu nome completo:".to_string()
    }

    pub fn ask_phone(&self, name: &str) -> String {
        format!(
            "Prazer em conhecê-lo(a), **{name}**! 😊\n\n\
             Qual é o seu **telefone de contato**?\n\
             (confirme se este número do WhatsApp está correto)"
        )
    }

    pub fn phone_reprompt(&self) -> String {
        "Não consegui identificar o seu número por aqui. 📱\n\n\
         Por favor, digite seu **telefone de contato** com DDD:"
            .to_string()
    }

    pub fn ask_city(&self, phone: &str) -> String {
        format!("Telefone registrado: **{phone}** ✅\n\nDe qual **cidade** você está falando?")
    }

    pub fn ask_project(&self, city: &str) -> String {
        format!(
            "Cidade registrada: **{city}** 📍\n\n\
             Você já possui um **projeto com arquiteto(a)** ou deseja que nossa equipe \
             desenvolva um **novo projeto exclusivo** para você?\n\n\
             Digite:\n{}",
            Self::project_menu()
        )
    }

    pub fn project_reprompt(&self) -> String {
        format!("Por favor, escolha uma das opções:\n\n{}", Self::project_menu())
    }

    pub fn ask_room(&self, project: ProjectType) -> String {
        format!(
            "Projeto: **{project}** 🏗️\n\nQual **ambiente** você deseja planejar?\n\n{}",
            Self::room_menu()
        )
    }

    pub fn ask_follow_up(&self, room: &Room) -> String {
        format!(
            "Ambiente: **{room}** 🏠\n\n\
             Deseja que eu registre um **aviso para nossa equipe** entrar em contato e \
             agendar uma visita à loja/fábrica?\n\n\
             Digite:\n\
             ✅ Sim, quero que entrem em contato\n\
             ❌ Não, apenas registrar os dados"
        )
    }

    pub fn closing(&self, name: &str, unit: Unit, wants_follow_up: bool) -> String {
        let follow_up = if wants_follow_up {
            "Nossa equipe foi notificada e entrará em contato em breve para agendar sua visita! 📅"
        } else {
            "Seus dados foram registrados com sucesso! 📝"
        };
        format!(
            "Obrigada pelas informações, **{name}**! 🎉\n\n\
             Já registrei seus dados e vou encaminhar para a nossa unidade de **{unit}**.\n\n\
             {follow_up}\n\n\
             Em breve, um de nossos especialistas da {business} entrará em contato para dar \
             continuidade ao seu projeto. ❤️\n\n\
             Tenha um ótimo dia!",
            business = self.business_name,
        )
    }

    pub fn already_finished(&self) -> String {
        "Olá! Seu atendimento já foi finalizado.\n\n\
         Se precisar de um novo atendimento, digite qualquer mensagem para começar novamente! 😊"
            .to_string()
    }
}

impl Default for Prompts {
    fn default() -> Self {
        let config = crate::config::IntakeConfig::default();
        Self::new(config.business_name, config.assistant_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_names_business_assistant_and_units() {
        let prompts = Prompts::new("Loja Teste", "Bia");
        let text = prompts.welcome();
        assert!(text.contains("Loja Teste"));
        assert!(text.contains("Bia"));
        assert!(text.contains("Ijui - RS"));
        assert!(text.contains("Catuipe - RS"));
    }

    #[test]
    fn room_menu_lists_vocabulary_in_order() {
        let text = Prompts::default().ask_room(ProjectType::NeedsNewPlan);
        let kitchen = text.find("1️⃣ Cozinha").unwrap();
        let other = text.find("6️⃣ Outro").unwrap();
        assert!(kitchen < other);
        assert!(text.contains("Preciso de um novo projeto"));
    }

    #[test]
    fn closing_reflects_follow_up_choice() {
        let prompts = Prompts::default();
        let yes = prompts.closing("Ana", Unit::Ijui, true);
        assert!(yes.contains("agendar sua visita"));
        assert!(yes.contains("**Ijui**"));

        let no = prompts.closing("Ana", Unit::Catuipe, false);
        assert!(no.contains("registrados com sucesso"));
        assert!(no.contains("**Catuipe**"));
    }
}
